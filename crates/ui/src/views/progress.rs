use dioxus::prelude::*;
use services::ProgressStore;

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ProgressVm, sign_in_message};

#[component]
pub fn ProgressView() -> Element {
    let ctx = use_context::<AppContext>();
    let progression = ctx.progression();
    let mut store = use_signal(|| None::<ProgressStore>);
    let mut flash = use_signal(|| None::<String>);
    let mut action_error = use_signal(|| None::<ViewError>);
    let mut signing = use_signal(|| false);

    // Loading the page hydrates the store and clears a stale sign-in flag
    // before anything reads it.
    let mut resource = use_resource(move || {
        let progression = progression.clone();
        async move {
            let mut loaded = ProgressStore::open(progression)
                .await
                .map_err(|err| ViewError::from(&err))?;
            loaded
                .init_sign()
                .await
                .map_err(|err| ViewError::from(&err))?;
            let vm = ProgressVm::from(&loaded.snapshot());
            store.set(Some(loaded));
            Ok(vm)
        }
    });

    let state = view_state_from_resource(resource);

    let on_sign = move |_: MouseEvent| {
        spawn(async move {
            let taken = store.write().take();
            let Some(mut current) = taken else {
                action_error.set(Some(ViewError::Unknown));
                return;
            };

            signing.set(true);
            match sign_in_action(&mut current).await {
                Ok(message) => {
                    flash.set(Some(message));
                    action_error.set(None);
                }
                Err(err) => action_error.set(Some(err)),
            }

            // Put the store back even after errors so the page stays usable.
            store.set(Some(current));
            signing.set(false);
        });
    };

    let current_vm = store
        .read()
        .as_ref()
        .map(|current| ProgressVm::from(&current.snapshot()));

    rsx! {
        div { class: "page",
            h2 { "Progress" }

            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(initial) => rsx! {
                    ProgressCard {
                        vm: current_vm.clone().unwrap_or(initial),
                        signing: signing(),
                        flash: flash(),
                        error: action_error(),
                        on_sign: on_sign,
                    }
                },
                ViewState::Error(err) => rsx! {
                    p { "{err.message()}" }
                    button { onclick: move |_| resource.restart(), "Retry" }
                },
            }
        }
    }
}

/// Run one sign-in and describe the outcome for the flash line.
///
/// On error the store keeps its in-memory state and stays usable.
async fn sign_in_action(store: &mut ProgressStore) -> Result<String, ViewError> {
    let outcome = store.do_sign().await.map_err(|err| ViewError::from(&err))?;
    Ok(sign_in_message(&outcome))
}

#[component]
fn ProgressCard(
    vm: ProgressVm,
    signing: bool,
    #[props(!optional)] flash: Option<String>,
    #[props(!optional)] error: Option<ViewError>,
    on_sign: EventHandler<MouseEvent>,
) -> Element {
    let button_label = vm.sign_button_label();
    let bar_style = vm.bar_style();

    rsx! {
        section { class: "progress-card",
            p { class: "muted", "{vm.user_label}" }
            h3 { "{vm.level_label}" }
            div { class: "level-bar",
                div { class: "level-bar-fill", style: "{bar_style}" }
            }
            p { "{vm.experience_label} ({vm.progress_pct}%)" }
            p { "{vm.sign_days_label}" }
            p { class: "muted", "{vm.last_sign_label}" }
            button {
                class: "sign-button",
                disabled: vm.signed_today || signing,
                onclick: move |evt| on_sign.call(evt),
                "{button_label}"
            }
            if let Some(message) = flash {
                p { class: "flash", "{message}" }
            }
            if let Some(err) = error {
                p { class: "flash error", "{err.message()}" }
            }
        }
    }
}
