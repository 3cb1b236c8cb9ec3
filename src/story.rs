//! The page's chapters, their copy, and the timelines that reveal them.

use crate::motion::{Ease, Frame, Position, Spring, Timeline, TriggerNotice, Tween};

pub const OWNER_NAME: &str = "Atharva Joshi";
pub const HERO_SCENE_URL: &str = "https://prod.spline.design/EF7JOSsHLk16Tlw9/scene.splinecode";
pub const CONTACT_EMAIL: &str = "hello@example.com";
pub const CONTACT_MAILTO: &str = "mailto:hello@example.com";
pub const GITHUB_URL: &str = "https://github.com";
pub const LINKEDIN_URL: &str = "https://www.linkedin.com";

pub const SKILL_BAR_DURATION: f64 = 1.2;
pub const SKILL_BAR_STAGGER: f64 = 0.12;
pub const SKILL_ORB_STAGGER: f64 = 0.08;
pub const SKILL_ORB_STIFFNESS: f64 = 120.0;
pub const PROJECT_CARD_STAGGER: f64 = 0.1;

pub const NAV_TRIGGER_START: &str = "top center";
pub const NAV_TRIGGER_END: &str = "bottom center";
pub const DIVIDER_TRIGGER_START: &str = "top 80%";
pub const PROJECTS_TRIGGER_START: &str = "top 60%";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Hero,
    Skills,
    Projects,
    Contact,
}

impl Section {
    pub const ALL: [Section; 4] = [Self::Hero, Self::Skills, Self::Projects, Self::Contact];

    pub fn id(self) -> &'static str {
        match self {
            Self::Hero => "hero",
            Self::Skills => "skills",
            Self::Projects => "projects",
            Self::Contact => "contact",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hero => "The Beginning",
            Self::Skills => "The Learning",
            Self::Projects => "The Creating",
            Self::Contact => "The Future",
        }
    }

    pub fn chapter(self) -> u8 {
        match self {
            Self::Hero => 1,
            Self::Skills => 2,
            Self::Projects => 3,
            Self::Contact => 4,
        }
    }
}

/// Which chapter the progress navigation highlights.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavigationTracker {
    active: Section,
}

impl Default for NavigationTracker {
    fn default() -> Self {
        Self {
            active: Section::Hero,
        }
    }
}

impl NavigationTracker {
    pub fn active(&self) -> Section {
        self.active
    }

    /// Applies one section trigger notice; returns `true` if the highlight
    /// moved. Only triggers still active after their frame's batch count, so
    /// a jump across several sections lands on the last one reached.
    pub fn observe(&mut self, section: Section, notice: TriggerNotice) -> bool {
        if !notice.event.is_active() || !notice.active || self.active == section {
            return false;
        }
        self.active = section;
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Skill {
    pub name: &'static str,
    pub level: f64,
}

pub const SKILLS: [Skill; 6] = [
    Skill { name: "React", level: 90.0 },
    Skill { name: "TypeScript", level: 85.0 },
    Skill { name: "GSAP", level: 88.0 },
    Skill { name: "Three.js", level: 75.0 },
    Skill { name: "Framer Motion", level: 92.0 },
    Skill { name: "Node.js", level: 80.0 },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Project {
    pub title: &'static str,
    pub description: &'static str,
    pub tag: &'static str,
}

pub const PROJECTS: [Project; 3] = [
    Project {
        title: "Cinematic Portfolio",
        description: "A narrative-driven web experience with GSAP + Three.js",
        tag: "Featured",
    },
    Project {
        title: "Realtime Visualizer",
        description: "Audio-reactive shaders and particles",
        tag: "WebGL",
    },
    Project {
        title: "Design System",
        description: "Accessible, animated components for the modern web",
        tag: "UI/UX",
    },
];

pub const SKILLS_DIVIDER: &str = "Every line of code is a frame in the film of a product.";
pub const PROJECTS_DIVIDER: &str = "Creation is a loop — imagine, build, refine, repeat.";

/// Target groups of the hero intro timeline.
pub mod hero_groups {
    pub const TITLE: usize = 0;
    pub const SUBTITLE: usize = 1;
    pub const CTA: usize = 2;
}

pub fn hero_intro() -> Timeline {
    let overlap = Position::Relative(-0.6);
    Timeline::new("hero_intro")
        .add(
            Tween::from(hero_groups::TITLE, Frame::new().y(40.0).opacity(0.0))
                .duration(1.0)
                .ease(Ease::Power3Out),
        )
        .add(
            Tween::from(hero_groups::SUBTITLE, Frame::new().y(20.0).opacity(0.0))
                .duration(0.8)
                .at(overlap),
        )
        .add(
            Tween::from(hero_groups::CTA, Frame::new().y(20.0).opacity(0.0))
                .duration(0.8)
                .at(overlap),
        )
}

pub fn divider_reveal() -> Timeline {
    Timeline::new("divider_reveal").add(
        Tween::from_to(0, Frame::new().opacity(0.0).y(20.0), Frame::new().opacity(1.0).y(0.0))
            .duration(0.8)
            .ease(Ease::Power3Out),
    )
}

pub fn project_cards(count: usize) -> Timeline {
    Timeline::new("project_cards").add(
        Tween::from(0, Frame::new().y(40.0).opacity(0.0))
            .duration(0.8)
            .ease(Ease::Power3Out)
            .stagger(count, PROJECT_CARD_STAGGER),
    )
}

/// Group 0 holds the skill orbs; group `1 + i` is the bar of skill `i`.
pub fn skills_reveal(skills: &[Skill]) -> Timeline {
    let spring = Spring::with_stiffness(SKILL_ORB_STIFFNESS);
    let orbs = Tween::from(0, Frame::new().opacity(0.0).y(20.0).scale(0.95))
        .duration(spring.settle_duration())
        .ease(Ease::Spring(spring))
        .stagger(skills.len(), SKILL_ORB_STAGGER)
        .at(Position::Absolute(0.0));

    skills
        .iter()
        .enumerate()
        .fold(Timeline::new("skills_reveal").add(orbs), |timeline, (index, skill)| {
            timeline.add(
                Tween::to(skill_bar_group(index), Frame::new().width_percent(skill.level))
                    .duration(SKILL_BAR_DURATION)
                    .delay(crate::motion::stagger_delay(index, SKILL_BAR_STAGGER))
                    .at(Position::Absolute(0.0)),
            )
        })
}

pub fn skill_bar_group(index: usize) -> usize {
    1 + index
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactLink {
    pub label: &'static str,
    pub href: &'static str,
    /// Opens in a new tab.
    pub external: bool,
}

pub const CONTACT_LINKS: [ContactLink; 3] = [
    ContactLink {
        label: "Email",
        href: CONTACT_MAILTO,
        external: false,
    },
    ContactLink {
        label: "GitHub",
        href: GITHUB_URL,
        external: true,
    },
    ContactLink {
        label: "LinkedIn",
        href: LINKEDIN_URL,
        external: true,
    },
];

pub const CONTACT_CONFIRMATION: &str = "Thanks! Your message is taking off.";

/// Local-only contact form: submitting acknowledges, nothing is sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    sent: bool,
    submissions: u32,
}

impl ContactForm {
    pub fn confirmation(&self) -> Option<&'static str> {
        self.sent.then_some(CONTACT_CONFIRMATION)
    }

    pub fn submissions(&self) -> u32 {
        self.submissions
    }

    pub fn has_required_fields(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }

    /// Records one submission. Returns `false` when required fields are
    /// missing, which the browser's own validation normally prevents.
    pub fn submit(&mut self) -> bool {
        if !self.has_required_fields() {
            return false;
        }
        self.sent = true;
        self.submissions += 1;
        true
    }
}
