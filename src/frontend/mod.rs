mod components;
mod dom;
mod hooks;
mod runtime;
mod sections;

use web_sys::{window, Storage};
use yew::prelude::*;

use crate::config::{MotionConfig, SettingSource};
use components::ProgressNav;
use hooks::use_motion_runtime;
use runtime::MotionHandle;
use sections::{Contact, Hero, Projects, Skills};

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

struct LocalStorageSettings(Option<Storage>);

impl SettingSource for LocalStorageSettings {
    fn setting(&self, key: &str) -> Option<String> {
        self.0.as_ref()?.get_item(key).ok().flatten()
    }
}

fn resolve_config() -> MotionConfig {
    MotionConfig::from_source(&LocalStorageSettings(local_storage()))
        .with_reduced_motion(dom::prefers_reduced_motion())
}

#[function_component(App)]
fn app() -> Html {
    let config = use_memo((), |_| resolve_config());
    let motion = use_motion_runtime(*config);

    html! {
        <ContextProvider<MotionHandle> context={motion}>
            <a class="skip-link" href="#content">{"Skip to main content"}</a>
            <ProgressNav />
            <main id="content">
                <Hero />
                <Skills />
                <Projects />
                <Contact />
            </main>
        </ContextProvider<MotionHandle>>
    }
}

pub fn run() {
    console_error_panic_hook::set_once();

    yew::Renderer::<App>::with_root(
        window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("app"))
            .expect("missing #app mount point"),
    )
    .render();
}
