use std::rc::Rc;

use serde_json::json;
use web_sys::MouseEvent;
use yew::prelude::*;

use super::hooks::{
    use_logger, use_magnetic, use_motion, use_motion_config, use_parallax, use_spotlight,
    use_timeline, TimelineStart,
};
use super::runtime::{Registration, TriggerTarget};
use crate::motion::{TriggerNotice, TriggerSpec};
use crate::story::{self, NavigationTracker, Section};

#[derive(Properties, PartialEq)]
pub struct MagneticButtonProps {
    #[prop_or_default]
    pub children: Html,
    #[prop_or_default]
    pub class: Classes,
    #[prop_or_default]
    pub onclick: Callback<MouseEvent>,
    #[prop_or(AttrValue::Static("button"))]
    pub button_type: AttrValue,
}

#[function_component(MagneticButton)]
pub fn magnetic_button(props: &MagneticButtonProps) -> Html {
    let node = use_node_ref();
    let config = use_motion_config();
    use_magnetic(node.clone(), config.magnetic_strength);

    html! {
        <button
            ref={node}
            class={classes!("magnetic-button", props.class.clone())}
            type={props.button_type.clone()}
            onclick={props.onclick.clone()}
        >
            {props.children.clone()}
        </button>
    }
}

#[derive(Properties, PartialEq)]
pub struct ParallaxImageProps {
    pub src: AttrValue,
    #[prop_or_default]
    pub alt: AttrValue,
    #[prop_or_default]
    pub class: Classes,
    /// Overrides the configured depth.
    #[prop_or_default]
    pub depth: Option<f64>,
}

#[function_component(ParallaxImage)]
pub fn parallax_image(props: &ParallaxImageProps) -> Html {
    let frame = use_node_ref();
    let config = use_motion_config();
    use_parallax(
        frame.clone(),
        props.depth.unwrap_or(config.parallax_depth),
        config.parallax_leave,
    );

    html! {
        <div ref={frame} class={classes!("parallax-image", props.class.clone())}>
            <img src={props.src.clone()} alt={props.alt.clone()} loading="lazy" />
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct HoverCardProps {
    /// Owned by the parent so timelines can target the card.
    pub node: NodeRef,
    #[prop_or_default]
    pub class: Classes,
    #[prop_or_default]
    pub children: Html,
}

/// Card with a radial glow that follows the pointer.
#[function_component(HoverCard)]
pub fn hover_card(props: &HoverCardProps) -> Html {
    use_spotlight(props.node.clone());

    html! {
        <div ref={props.node.clone()} class={classes!("hover-card", props.class.clone())}>
            <div class="hover-card-glow" aria-hidden="true"></div>
            <div class="hover-card-body">{props.children.clone()}</div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ChapterTitleProps {
    pub section: Section,
    #[prop_or_default]
    pub subtitle: Option<AttrValue>,
}

#[function_component(ChapterTitle)]
pub fn chapter_title(props: &ChapterTitleProps) -> Html {
    let heading_id = format!("{}-heading", props.section.id());

    html! {
        <header class="chapter-title">
            <span class="chapter-badge" aria-hidden="true">{props.section.chapter()}</span>
            <div class="chapter-title-text">
                <p class="chapter-index">{format!("Chapter {:02}", props.section.chapter())}</p>
                <h2 id={heading_id}>{props.section.label()}</h2>
            </div>
            if let Some(subtitle) = props.subtitle.clone() {
                <p class="chapter-subtitle">{subtitle}</p>
            }
        </header>
    }
}

#[derive(Properties, PartialEq)]
pub struct ChapterDividerProps {
    pub text: AttrValue,
}

#[function_component(ChapterDivider)]
pub fn chapter_divider(props: &ChapterDividerProps) -> Html {
    let node = use_node_ref();
    use_timeline(
        story::divider_reveal(),
        vec![vec![node.clone()]],
        TimelineStart::Trigger(
            TriggerTarget::Node(node.clone()),
            TriggerSpec::once(story::DIVIDER_TRIGGER_START).ok(),
        ),
    );

    html! {
        <blockquote ref={node} class="chapter-divider">
            <p>{props.text.clone()}</p>
        </blockquote>
    }
}

#[derive(Clone, Copy, Default, PartialEq)]
struct NavState {
    tracker: NavigationTracker,
}

impl Reducible for NavState {
    type Action = (Section, TriggerNotice);

    fn reduce(self: Rc<Self>, (section, notice): Self::Action) -> Rc<Self> {
        let mut tracker = self.tracker;
        if tracker.observe(section, notice) {
            Rc::new(Self { tracker })
        } else {
            self
        }
    }
}

/// Fixed chapter markers; the active one follows the reader's scroll.
#[function_component(ProgressNav)]
pub fn progress_nav() -> Html {
    let motion = use_motion();
    let logger = use_logger();
    let nav = use_reducer(NavState::default);
    let active = nav.tracker.active();

    {
        let motion = motion.clone();
        let dispatcher = nav.dispatcher();
        use_effect_with((), move |_| {
            let registrations: Vec<Registration> = motion
                .map(|motion| {
                    Section::ALL
                        .into_iter()
                        .filter_map(|section| {
                            let spec = TriggerSpec::toggle(story::NAV_TRIGGER_START, story::NAV_TRIGGER_END).ok()?;
                            let dispatcher = dispatcher.clone();
                            Some(motion.register_trigger(
                                TriggerTarget::ElementId(section.id()),
                                spec,
                                Callback::from(move |notice| dispatcher.dispatch((section, notice))),
                            ))
                        })
                        .collect()
                })
                .unwrap_or_default();
            move || drop(registrations)
        });
    }

    use_effect_with(active, move |active| {
        logger.info("section_active", json!({ "section": active.id() }));
        || ()
    });

    html! {
        <nav class="progress-nav" aria-label="Chapters">
            <ol>
                { for Section::ALL.into_iter().map(|section| {
                    let is_active = section == active;
                    let onclick = {
                        let motion = motion.clone();
                        Callback::from(move |event: MouseEvent| {
                            if let Some(motion) = motion.as_ref() {
                                event.prevent_default();
                                motion.scroll_to_section(section);
                            }
                        })
                    };

                    html! {
                        <li key={section.id()}>
                            <a
                                class={classes!("progress-marker", is_active.then_some("is-active"))}
                                href={format!("#{}", section.id())}
                                aria-current={is_active.then_some("step")}
                                onclick={onclick}
                            >
                                <span class="progress-dot" aria-hidden="true"></span>
                                <span class="progress-label">{section.label()}</span>
                            </a>
                        </li>
                    }
                }) }
            </ol>
        </nav>
    }
}
