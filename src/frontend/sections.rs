use std::rc::Rc;

use serde_json::json;
use web_sys::{HtmlInputElement, HtmlTextAreaElement, InputEvent, MouseEvent, SubmitEvent};
use yew::prelude::*;

use super::components::{ChapterDivider, ChapterTitle, HoverCard, MagneticButton, ParallaxImage};
use super::hooks::{use_in_view, use_logger, use_motion, use_motion_config, use_timeline, TimelineStart};
use super::runtime::{MotionHandle, TriggerTarget};
use crate::motion::TriggerSpec;
use crate::story::{self, hero_groups, ContactForm, Section, PROJECTS, SKILLS};

const CONSTELLATION_IMAGE: &str = "/assets/constellation.svg";

fn scroll_to(section: Section, motion: Option<MotionHandle>) -> Callback<MouseEvent> {
    Callback::from(move |event: MouseEvent| {
        if let Some(motion) = motion.as_ref() {
            event.prevent_default();
            motion.scroll_to_section(section);
        }
    })
}

#[function_component(Hero)]
pub fn hero() -> Html {
    let motion = use_motion();
    let title = use_node_ref();
    let subtitle = use_node_ref();
    let cta = use_node_ref();

    let mut groups = vec![Vec::new(); 3];
    groups[hero_groups::TITLE].push(title.clone());
    groups[hero_groups::SUBTITLE].push(subtitle.clone());
    groups[hero_groups::CTA].push(cta.clone());
    use_timeline(story::hero_intro(), groups, TimelineStart::Mount);

    html! {
        <section id={Section::Hero.id()} class="chapter hero" aria-labelledby="hero-title">
            <div class="hero-scene" aria-hidden="true">
                <spline-viewer url={story::HERO_SCENE_URL}></spline-viewer>
            </div>
            <div class="hero-copy">
                <p class="chapter-index">{format!("Chapter {:02} · {}", Section::Hero.chapter(), Section::Hero.label())}</p>
                <h1 id="hero-title" ref={title}>{story::OWNER_NAME}</h1>
                <p class="hero-subtitle" ref={subtitle}>
                    {"Engineer of moving pictures for the web. Every scroll is a cut, every hover a close-up."}
                </p>
                <div class="hero-cta" ref={cta}>
                    <MagneticButton onclick={scroll_to(Section::Skills, motion.clone())}>
                        {"Explore the journey"}
                    </MagneticButton>
                </div>
            </div>
            <a class="scroll-cue" href={format!("#{}", Section::Projects.id())} onclick={scroll_to(Section::Projects, motion)}>
                <span>{"Scroll"}</span>
                <span class="scroll-cue-line" aria-hidden="true"></span>
            </a>
        </section>
    }
}

#[function_component(Skills)]
pub fn skills() -> Html {
    let config = use_motion_config();
    let grid = use_node_ref();
    let orbs = use_memo((), |_| SKILLS.iter().map(|_| NodeRef::default()).collect::<Vec<_>>());
    let bars = use_memo((), |_| SKILLS.iter().map(|_| NodeRef::default()).collect::<Vec<_>>());

    let targets = std::iter::once(orbs.to_vec())
        .chain(bars.iter().map(|bar| vec![bar.clone()]))
        .collect();
    let reveal = use_timeline(story::skills_reveal(&SKILLS), targets, TimelineStart::Manual);
    let in_view = use_in_view(grid.clone(), config.skills_threshold, true);

    use_effect_with(in_view, move |open| {
        if *open {
            reveal.emit(());
        }
        || ()
    });

    html! {
        <section id={Section::Skills.id()} class="chapter skills" aria-labelledby="skills-heading">
            <ChapterTitle section={Section::Skills} subtitle={AttrValue::from("Tools picked up one frame at a time.")} />
            <div class="skills-layout">
                <div ref={grid} class="skills-grid">
                    { for SKILLS.iter().zip(orbs.iter()).zip(bars.iter()).map(|((skill, orb), bar)| html! {
                        <HoverCard key={skill.name} node={orb.clone()} class="skill-orb">
                            <p class="skill-name">{skill.name}</p>
                            <div
                                class="skill-bar"
                                role="progressbar"
                                aria-label={skill.name}
                                aria-valuemin="0"
                                aria-valuemax="100"
                                aria-valuenow={format!("{}", skill.level)}
                            >
                                <div ref={bar.clone()} class="skill-bar-fill" style="width: 0%"></div>
                            </div>
                            <p class="skill-level">{format!("{}%", skill.level)}</p>
                        </HoverCard>
                    }) }
                </div>
                <ParallaxImage src={CONSTELLATION_IMAGE} alt="Constellation of connected skills" class="skills-art" />
            </div>
            <ChapterDivider text={story::SKILLS_DIVIDER} />
        </section>
    }
}

#[function_component(Projects)]
pub fn projects() -> Html {
    let section = use_node_ref();
    let cards = use_memo((), |_| PROJECTS.iter().map(|_| NodeRef::default()).collect::<Vec<_>>());

    use_timeline(
        story::project_cards(PROJECTS.len()),
        vec![cards.to_vec()],
        TimelineStart::Trigger(
            TriggerTarget::Node(section.clone()),
            TriggerSpec::once(story::PROJECTS_TRIGGER_START).ok(),
        ),
    );

    html! {
        <section ref={section} id={Section::Projects.id()} class="chapter projects" aria-labelledby="projects-heading">
            <ChapterTitle section={Section::Projects} subtitle={AttrValue::from("Things that shipped, and the stories behind them.")} />
            <div class="project-grid">
                { for PROJECTS.iter().zip(cards.iter()).map(|(project, card)| html! {
                    <HoverCard key={project.title} node={card.clone()} class="project-card">
                        <span class="project-tag">{project.tag}</span>
                        <h3>{project.title}</h3>
                        <p class="muted">{project.description}</p>
                    </HoverCard>
                }) }
            </div>
            <ChapterDivider text={story::PROJECTS_DIVIDER} />
        </section>
    }
}

pub enum ContactAction {
    Name(String),
    Email(String),
    Message(String),
    Submit,
}

impl Reducible for ContactForm {
    type Action = ContactAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            ContactAction::Name(value) => next.name = value,
            ContactAction::Email(value) => next.email = value,
            ContactAction::Message(value) => next.message = value,
            ContactAction::Submit => {
                if !next.submit() {
                    return self;
                }
            }
        }
        Rc::new(next)
    }
}

#[function_component(Contact)]
pub fn contact() -> Html {
    let form = use_reducer(ContactForm::default);
    let logger = use_logger();
    let year = js_sys::Date::new_0().get_full_year();

    use_effect_with(form.submissions(), move |submissions| {
        if *submissions > 0 {
            logger.info("contact_submitted", json!({ "submissions": submissions }));
        }
        || ()
    });

    let on_name = {
        let form = form.dispatcher();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            form.dispatch(ContactAction::Name(input.value()));
        })
    };

    let on_email = {
        let form = form.dispatcher();
        Callback::from(move |event: InputEvent| {
            let input: HtmlInputElement = event.target_unchecked_into();
            form.dispatch(ContactAction::Email(input.value()));
        })
    };

    let on_message = {
        let form = form.dispatcher();
        Callback::from(move |event: InputEvent| {
            let input: HtmlTextAreaElement = event.target_unchecked_into();
            form.dispatch(ContactAction::Message(input.value()));
        })
    };

    let on_submit = {
        let form = form.dispatcher();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            form.dispatch(ContactAction::Submit);
        })
    };

    html! {
        <section id={Section::Contact.id()} class="chapter contact" aria-labelledby="contact-heading">
            <ChapterTitle section={Section::Contact} subtitle={AttrValue::from("The next scene is unwritten. Let's write it together.")} />
            <form class="contact-form" onsubmit={on_submit}>
                <label>
                    <span>{"Name"}</span>
                    <input type="text" name="name" required=true value={form.name.clone()} oninput={on_name} />
                </label>
                <label>
                    <span>{"Email"}</span>
                    <input type="email" name="email" required=true value={form.email.clone()} oninput={on_email} />
                </label>
                <label>
                    <span>{"Message"}</span>
                    <textarea name="message" rows="5" value={form.message.clone()} oninput={on_message} />
                </label>
                <MagneticButton button_type="submit">{"Send message"}</MagneticButton>
                if let Some(confirmation) = form.confirmation() {
                    <p class="contact-confirmation" role="status">{confirmation}</p>
                }
            </form>
            <nav class="contact-links" aria-label="Elsewhere">
                { for story::CONTACT_LINKS.iter().map(|link| html! {
                    <a
                        key={link.label}
                        class="link"
                        href={link.href}
                        aria-label={link.label}
                        target={link.external.then_some("_blank")}
                        rel={link.external.then_some("noopener noreferrer")}
                    >
                        {link.label}
                    </a>
                }) }
            </nav>
            <footer class="site-footer">
                <p>{format!("© {} {}", year, story::OWNER_NAME)}</p>
                <a class="link" href={story::CONTACT_MAILTO}>{story::CONTACT_EMAIL}</a>
            </footer>
        </section>
    }
}
