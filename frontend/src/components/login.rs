use std::time::Duration;

use crate::auth::{login_redirect, use_auth};
use crate::components::layout::AuthLayout;
use crate::components::notification::{Toast, provide_notifier};
use crate::flow::notice::Notice;
use crate::flow::validation::{Field, validate_login};
use crate::flow::wizard::{Transition, WizardEvent, WizardStep};
use leptos::prelude::*;
use leptos::task::spawn_local;

mod fields;
mod form_state;
mod otp_step;
mod signup_steps;

use fields::{SubmitButton, TextField};
use form_state::{StepErrors, WizardHandle};
use otp_step::OtpStep;
use signup_steps::{AccountValidationStep, NameSearchStep, SignupDetailsStep, SignupSuccessStep};

/// 跳转前保持加载遮罩可见的时长
const LOGIN_OVERLAY_MS: u64 = 500;

#[component]
fn LoginEmailStep(wizard: WizardHandle) -> impl IntoView {
    let auth = use_auth();
    let email = RwSignal::new(String::new());
    let errors = StepErrors::new();

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let field_errors = validate_login(&email.get_untracked());
        if !field_errors.is_empty() {
            errors.replace(field_errors);
            return;
        }

        let hint = email.get_untracked().trim().to_string();
        let event = WizardEvent::LoginSubmitted { email: hint.clone() };
        if wizard.dispatch(event) != Some(Transition::Redirect) {
            return;
        }
        let Some(generation) = wizard.begin_submit() else {
            return;
        };

        set_timeout(
            move || {
                spawn_local(async move {
                    // 成功时页面已离开；返回说明跳转本身失败
                    if let Err(e) = login_redirect(&auth, Some(hint)).await {
                        wizard.notify(Notice::error(e.to_string()));
                    }
                    wizard.finish_submit(generation);
                });
            },
            Duration::from_millis(LOGIN_OVERLAY_MS),
        );
    };

    view! {
        <Show when=move || wizard.is_submitting()>
            <div class="fixed inset-0 z-50 flex items-center justify-center bg-base-100/70">
                <span class="loading loading-spinner loading-lg text-primary"></span>
            </div>
        </Show>

        <form on:submit=on_submit novalidate>
            <h2 class="text-lg font-medium mb-2">"Login"</h2>
            <TextField
                id="email"
                label="Email"
                field=Field::Email
                value=email
                errors=errors
                input_type="email"
                autocomplete="email"
            />
            <SubmitButton wizard=wizard label="Login" busy_label="Loading…" />

            <div class="text-center text-sm mt-4">
                <span>"Don't have an account? "</span>
                <button
                    type="button"
                    class="link link-primary font-semibold"
                    on:click=move |_| {
                        wizard.dispatch(WizardEvent::SignUpRequested);
                    }
                >
                    "Sign Up"
                </button>
            </div>
        </form>
    }
}

/// 登录 / 注册向导
///
/// 步骤切换时整个步骤组件重建，步骤内的输入随之丢弃。
#[component]
fn SignupFlow() -> impl IntoView {
    let wizard = WizardHandle::new();
    let step = Memo::new(move |_| wizard.step());

    move || match step.get() {
        WizardStep::LoginEmailEntry => view! { <LoginEmailStep wizard=wizard /> }.into_any(),
        WizardStep::AccountValidation => view! { <AccountValidationStep wizard=wizard /> }.into_any(),
        WizardStep::NameSearch => view! { <NameSearchStep wizard=wizard /> }.into_any(),
        WizardStep::SignupDetails => view! { <SignupDetailsStep wizard=wizard /> }.into_any(),
        WizardStep::OtpVerification => view! { <OtpStep wizard=wizard /> }.into_any(),
        WizardStep::SignupSuccess => view! { <SignupSuccessStep wizard=wizard /> }.into_any(),
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let notifier = provide_notifier();

    view! {
        <AuthLayout>
            <Toast notifier=notifier />
            <SignupFlow />
        </AuthLayout>
    }
}
