//! 注册流程的各步骤
//!
//! 每个步骤只持有自己的输入；跨步骤的数据（客户 ID、验证码邮箱）
//! 由 `WizardState` 显式传递。

use leptos::prelude::*;
use leptos::task::spawn_local;

use dafonow_shared::ContactRecord;

use super::fields::{LoginLink, StepHeader, SubmitButton, TextField};
use super::form_state::{StepErrors, WizardHandle};
use crate::components::captcha::HumanVerification;
use crate::components::contacts_search::ContactsSearch;
use crate::components::icons::CheckCircle;
use crate::flow::captcha::CaptchaState;
use crate::flow::notice::Notice;
use crate::flow::submit::{self, AccountForm, MSG_NEW_ACCOUNT_INFO};
use crate::flow::validation::{
    Field, NAME_MAX_LENGTH, PHONE_MAX_LENGTH, SignupDetails, ZIP_MAX_LENGTH,
};
use crate::flow::wizard::WizardEvent;

// =========================================================
// AccountValidation
// =========================================================

#[component]
pub fn AccountValidationStep(wizard: WizardHandle) -> impl IntoView {
    let account_number = RwSignal::new(String::new());
    let billing_zip_code = RwSignal::new(String::new());
    let errors = StepErrors::new();

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(generation) = wizard.begin_submit() else {
            return;
        };

        let form = AccountForm {
            account_number: account_number.get_untracked(),
            billing_zip_code: billing_zip_code.get_untracked(),
        };
        spawn_local(async move {
            let outcome = submit::submit_account(wizard.api().as_ref(), &form).await;
            errors.replace(wizard.settle(generation, outcome));
        });
    };

    let request_new_account = move |_| wizard.notify(Notice::info(MSG_NEW_ACCOUNT_INFO));

    view! {
        <form on:submit=on_submit novalidate>
            <StepHeader wizard=wizard title="Sign up" back=true />
            <TextField
                id="account_number"
                label="Account Number"
                field=Field::AccountNumber
                value=account_number
                errors=errors
                live=true
            />
            <TextField
                id="billing_zip_code"
                label="Billing Zip Code"
                field=Field::BillingZipCode
                value=billing_zip_code
                errors=errors
                max_length=ZIP_MAX_LENGTH
                live=true
            />
            <SubmitButton wizard=wizard label="Next" busy_label="Validating…" />

            <Show when=move || wizard.state.with(|w| w.offers_new_account())>
                <button type="button" class="btn btn-outline btn-secondary w-full mt-2" on:click=request_new_account>
                    "Request New Account"
                </button>
            </Show>

            <LoginLink wizard=wizard />
        </form>
    }
}

// =========================================================
// NameSearch
// =========================================================

#[component]
pub fn NameSearchStep(wizard: WizardHandle) -> impl IntoView {
    let selected = RwSignal::new(None::<ContactRecord>);
    let captcha = RwSignal::new(CaptchaState::default());
    let errors = StepErrors::new();

    // 选中联系人 / 完成验证后对应错误不再显示
    let contact_error =
        Signal::derive(move || errors.get(Field::Contact).filter(|_| selected.with(Option::is_none)));
    let captcha_error = Signal::derive(move || {
        errors
            .get(Field::Captcha)
            .filter(|_| !captcha.with(CaptchaState::is_verified))
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(generation) = wizard.begin_submit() else {
            return;
        };

        let customer_id = wizard.state.with_untracked(|w| w.customer_id.clone());
        let contact = selected.get_untracked();
        let captcha_state = captcha.get_untracked();
        spawn_local(async move {
            let outcome = submit::submit_contact(
                wizard.api().as_ref(),
                customer_id.as_deref(),
                contact.as_ref(),
                &captcha_state,
            )
            .await;
            errors.replace(wizard.settle(generation, outcome));
        });
    };

    view! {
        <form on:submit=on_submit novalidate class="space-y-3">
            <StepHeader wizard=wizard title="Sign up" back=true />
            <p class="text-sm text-base-content/70">"Search for your name to link your account."</p>

            <ContactsSearch selected=selected error=contact_error />
            <HumanVerification captcha=captcha error=captcha_error />

            <SubmitButton wizard=wizard label="Sign up" busy_label="Signing up…" />

            <div class="text-center text-sm">
                <span>"Your name's not on the list? "</span>
                <button
                    type="button"
                    class="link link-primary font-semibold"
                    on:click=move |_| {
                        wizard.dispatch(WizardEvent::RegisterAsNew);
                    }
                >
                    "Register as New"
                </button>
            </div>
            <LoginLink wizard=wizard />
        </form>
    }
}

// =========================================================
// SignupDetails
// =========================================================

#[component]
pub fn SignupDetailsStep(wizard: WizardHandle) -> impl IntoView {
    let first_name = RwSignal::new(String::new());
    let last_name = RwSignal::new(String::new());
    let phone = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let captcha = RwSignal::new(CaptchaState::default());
    let errors = StepErrors::new();

    let captcha_error = Signal::derive(move || {
        errors
            .get(Field::Captcha)
            .filter(|_| !captcha.with(CaptchaState::is_verified))
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let Some(generation) = wizard.begin_submit() else {
            return;
        };

        let customer_id = wizard.state.with_untracked(|w| w.customer_id.clone());
        let details = SignupDetails {
            first_name: first_name.get_untracked(),
            last_name: last_name.get_untracked(),
            phone: phone.get_untracked(),
            email: email.get_untracked(),
        };
        let captcha_state = captcha.get_untracked();
        spawn_local(async move {
            let outcome = submit::submit_details(
                wizard.api().as_ref(),
                customer_id.as_deref(),
                &details,
                &captcha_state,
            )
            .await;
            errors.replace(wizard.settle(generation, outcome));
        });
    };

    view! {
        <form on:submit=on_submit novalidate class="space-y-1">
            <StepHeader wizard=wizard title="Sign up" back=true />
            <div class="grid grid-cols-2 gap-4">
                <TextField
                    id="first_name"
                    label="First Name"
                    field=Field::FirstName
                    value=first_name
                    errors=errors
                    max_length=NAME_MAX_LENGTH
                    autocomplete="given-name"
                />
                <TextField
                    id="last_name"
                    label="Last Name"
                    field=Field::LastName
                    value=last_name
                    errors=errors
                    max_length=NAME_MAX_LENGTH
                    autocomplete="family-name"
                />
            </div>
            <TextField
                id="phone"
                label="Phone"
                field=Field::Phone
                value=phone
                errors=errors
                input_type="tel"
                max_length=PHONE_MAX_LENGTH
                autocomplete="tel"
            />
            <TextField
                id="signup_email"
                label="Email"
                field=Field::Email
                value=email
                errors=errors
                input_type="email"
                autocomplete="email"
            />
            <div class="pt-2">
                <HumanVerification captcha=captcha error=captcha_error />
            </div>
            <SubmitButton wizard=wizard label="Next" busy_label="Submitting…" />
            <LoginLink wizard=wizard />
        </form>
    }
}

// =========================================================
// SignupSuccess
// =========================================================

#[component]
pub fn SignupSuccessStep(wizard: WizardHandle) -> impl IntoView {
    view! {
        <div class="flex flex-col items-center text-center gap-4 py-4">
            <CheckCircle attr:class="h-16 w-16 text-success" />
            <h2 class="text-xl font-semibold">"Sign up complete"</h2>
            <p class="text-sm text-base-content/70">
                "Your account is ready. Log in with your email to continue."
            </p>
            <button type="button" class="btn btn-primary w-full" on:click=move |_| wizard.return_to_login()>
                "Go to Login"
            </button>
        </div>
    }
}
