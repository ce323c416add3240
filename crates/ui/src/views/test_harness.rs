use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use services::{Clock, ProgressionService, RewardSource};
use storage::repository::KeyValueStore;

use crate::context::{UiApp, build_app_context};
use crate::views::ProgressView;

#[derive(Clone)]
struct TestApp {
    progression: Arc<ProgressionService>,
}

impl UiApp for TestApp {
    fn progression(&self) -> Arc<ProgressionService> {
        Arc::clone(&self.progression)
    }
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for ViewHarnessProps {}

#[component]
fn ProgressHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    rsx! { ProgressView {} }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Rebuild and let the page's load task finish.
    pub async fn settle(&mut self) {
        self.rebuild();
        for _ in 0..3 {
            self.drive_async().await;
        }
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

pub fn setup_progress_harness(store: Arc<dyn KeyValueStore>, clock: Clock) -> ViewHarness {
    let progression =
        Arc::new(ProgressionService::new(clock, store).with_rewards(RewardSource::Fixed(20)));
    let app = Arc::new(TestApp { progression });
    let dom = VirtualDom::new_with_props(ProgressHarness, ViewHarnessProps { app });
    ViewHarness { dom }
}
