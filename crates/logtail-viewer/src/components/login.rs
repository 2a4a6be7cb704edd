//! Login overlay: request a verification code, then submit it.

use dioxus::prelude::*;
use logtail_client::ClientError;
use logtail_core::{LoginForm, Notice};

use crate::bridge;
use crate::state::ViewerContext;

#[component]
pub fn LoginPanel(on_close: EventHandler<()>) -> Element {
    let mut ctx = use_context::<ViewerContext>();
    let mut username = use_signal(String::new);
    let mut email = use_signal(String::new);
    let mut code = use_signal(String::new);
    let mut requesting = use_signal(|| false);
    let mut locked = use_signal(|| false);

    let ui = bridge::config().ui;
    let notice_duration = std::time::Duration::from_millis(ui.login_notice_ms);

    let form = move || LoginForm::new(username.read().clone(), email.read().clone(), code.read().clone());

    let on_request_code = move |_: MouseEvent| {
        let login = ctx.handle.read().login.clone();
        let form = form();
        spawn(async move {
            if let Err(e) = login.check_code_request(&form) {
                ctx.notify(Notice::error(e.to_string()).with_duration(notice_duration));
                return;
            }
            requesting.set(true);
            ctx.notify(Notice::success("Sending verification code").with_duration(notice_duration));
            let result = login.request_code(&form).await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "verification code request failed");
            }
            if !matches!(result, Err(ClientError::Validation(_))) {
                ctx.notify(Notice::from_result(&result).with_duration(notice_duration));
            }
            requesting.set(false);
        });
    };

    let on_submit = move |_: MouseEvent| {
        let login = ctx.handle.read().login.clone();
        let form = form();
        let redirect_delay = bridge::config().redirect_delay();
        spawn(async move {
            let result = login.submit(&form).await;
            ctx.notify(Notice::from_result(&result).with_duration(notice_duration));
            match result {
                Ok(_) => {
                    locked.set(true);
                    tokio::time::sleep(redirect_delay).await;
                    ctx.logged_in.set(true);
                    on_close.call(());
                }
                Err(e) => tracing::warn!(error = %e, "login rejected"),
            }
        });
    };

    let controls_disabled = *locked.read();

    rsx! {
        div { class: "login-overlay",
            div { class: "login-dialog",
                div { class: "login-header",
                    h2 { "Log in" }
                    button {
                        class: "login-close",
                        onclick: move |_| on_close.call(()),
                        "\u{00D7}"
                    }
                }
                input {
                    class: "login-input",
                    placeholder: "Username",
                    value: "{username}",
                    disabled: controls_disabled,
                    oninput: move |evt| username.set(evt.value()),
                }
                input {
                    class: "login-input",
                    placeholder: "Email",
                    value: "{email}",
                    disabled: controls_disabled,
                    oninput: move |evt| email.set(evt.value()),
                }
                div { class: "login-code-row",
                    input {
                        class: "login-input",
                        placeholder: "Verification code",
                        value: "{code}",
                        disabled: controls_disabled,
                        oninput: move |evt| code.set(evt.value()),
                    }
                    button {
                        class: "login-button secondary",
                        disabled: controls_disabled || *requesting.read(),
                        onclick: on_request_code,
                        "Send code"
                    }
                }
                button {
                    class: "login-button primary",
                    disabled: controls_disabled,
                    onclick: on_submit,
                    "Log in"
                }
            }
        }
    }
}
