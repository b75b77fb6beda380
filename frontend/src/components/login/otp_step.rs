//! 验证码输入步骤
//!
//! 六个单字符输入框：输入后焦点自动后移，空格上退格回到前一格，
//! 在任意格粘贴完整验证码会填满全部格子。

use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;

use dafonow_shared::OtpMethod;

use super::fields::{StepHeader, SubmitButton};
use super::form_state::{StepErrors, WizardHandle};
use crate::flow::otp::{OTP_LENGTH, OtpCells};
use crate::flow::submit;
use crate::flow::validation::Field;

#[component]
fn MethodToggle(method: RwSignal<OtpMethod>) -> impl IntoView {
    let option = move |value: OtpMethod, label: &'static str| {
        view! {
            <button
                type="button"
                class="btn btn-sm join-item"
                class:btn-active=move || method.get() == value
                on:click=move |_| method.set(value)
            >
                {label}
            </button>
        }
    };

    view! {
        <div class="join w-full justify-center">
            {option(OtpMethod::Email, "Send via Email")}
            {option(OtpMethod::Phone, "Send via Phone")}
        </div>
    }
}

#[component]
pub fn OtpStep(wizard: WizardHandle) -> impl IntoView {
    let email = wizard
        .state
        .with_untracked(|w| w.otp_email.clone())
        .unwrap_or_default();
    let method = RwSignal::new(OtpMethod::default());
    let cells = RwSignal::new(OtpCells::new());
    let errors = StepErrors::new();
    let refs: [NodeRef<Input>; OTP_LENGTH] = std::array::from_fn(|_| NodeRef::new());

    let focus = move |index: usize| {
        if let Some(el) = refs.get(index).and_then(|r| r.get()) {
            let _ = el.focus();
        }
    };

    let cell_input = move |index: usize| {
        view! {
            <input
                node_ref=refs[index]
                type="text"
                inputmode="numeric"
                autocomplete="one-time-code"
                aria-label=format!("Digit {}", index + 1)
                class="input input-bordered w-11 h-12 text-center text-lg px-0"
                prop:value=move || cells.with(|c| c.cell(index))
                on:input=move |ev| {
                    let raw = event_target_value(&ev);
                    let next = cells.try_update(|c| c.input(index, &raw)).flatten();
                    // DOM 值始终与模型一致（非数字输入会被还原）
                    event_target::<web_sys::HtmlInputElement>(&ev)
                        .set_value(&cells.with_untracked(|c| c.cell(index)));
                    errors.clear(Field::Otp);
                    if let Some(next) = next {
                        focus(next);
                    }
                }
                on:keydown=move |ev: leptos::ev::KeyboardEvent| {
                    if ev.key() == "Backspace" {
                        if let Some(prev) = cells.with_untracked(|c| c.backspace(index)) {
                            focus(prev);
                        }
                    }
                }
                on:paste=move |ev: leptos::ev::ClipboardEvent| {
                    ev.prevent_default();
                    let text = ev
                        .clipboard_data()
                        .and_then(|data| data.get_data("text").ok())
                        .unwrap_or_default();
                    if let Some(next) = cells.try_update(|c| c.paste(&text)).flatten() {
                        errors.clear(Field::Otp);
                        focus(next);
                    }
                }
            />
        }
    };

    let submit_email = email.clone();
    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(generation) = wizard.begin_submit() else {
            return;
        };

        let email = submit_email.clone();
        let method = method.get_untracked();
        let code = cells.get_untracked();
        spawn_local(async move {
            let outcome = submit::submit_otp(wizard.api().as_ref(), &email, method, &code).await;
            errors.replace(wizard.settle(generation, outcome));
        });
    };

    let resend_email = email.clone();
    let on_resend = move |_| {
        let email = resend_email.clone();
        let method = method.get_untracked();
        spawn_local(async move {
            let notice = submit::resend_otp(wizard.api().as_ref(), &email, method).await;
            wizard.notify(notice);
        });
    };

    let incomplete = Signal::derive(move || !cells.with(OtpCells::is_complete));

    view! {
        <form on:submit=on_submit novalidate class="space-y-4">
            <StepHeader wizard=wizard title="Sign up" back=true />
            <p class="text-sm text-base-content/70">
                "Enter the 6-digit code sent to " <span class="font-semibold">{email}</span>
            </p>

            <MethodToggle method=method />

            <div class="flex justify-center gap-2">
                {(0..OTP_LENGTH).map(cell_input).collect_view()}
            </div>
            {move || errors.get(Field::Otp).map(|msg| view! {
                <p class="text-error text-xs text-center">{msg}</p>
            })}

            <SubmitButton wizard=wizard label="Sign Up" busy_label="Signing up…" disabled=incomplete />

            <div class="text-center text-sm">
                <span>"Didn't receive the code? "</span>
                <button type="button" class="link link-primary font-semibold" on:click=on_resend>
                    "Resend again"
                </button>
            </div>
        </form>
    }
}
