//! 向导各步骤共用的表单控件

use leptos::prelude::*;

use super::form_state::{StepErrors, WizardHandle};
use crate::components::icons::ArrowLeft;
use crate::flow::validation::{Field, clamp_len, validate_account_field};

/// 带标签与字段错误的输入框
#[component]
pub fn TextField(
    id: &'static str,
    label: &'static str,
    field: Field,
    value: RwSignal<String>,
    errors: StepErrors,
    #[prop(default = "text")] input_type: &'static str,
    #[prop(optional)] max_length: Option<usize>,
    /// 每次输入都重新校验（账户表单）
    #[prop(optional)]
    live: bool,
    #[prop(optional)] autocomplete: Option<&'static str>,
) -> impl IntoView {
    let on_input = move |ev| {
        let raw = event_target_value(&ev);
        let next = match max_length {
            Some(max) => clamp_len(&raw, max),
            None => raw,
        };
        if live {
            errors.update(field, validate_account_field(field, &next));
        } else {
            errors.clear(field);
        }
        value.set(next);
    };

    view! {
        <div class="form-control">
            <label class="label" for=id>
                <span class="label-text">{label}</span>
            </label>
            <input
                id=id
                type=input_type
                autocomplete=autocomplete
                maxlength=max_length.map(|max| max.to_string())
                aria-label=label
                class="input input-bordered w-full"
                class:input-error=move || errors.get(field).is_some()
                prop:value=move || value.get()
                on:input=on_input
            />
            {move || errors.get(field).map(|msg| view! {
                <span class="text-error text-xs mt-1">{msg}</span>
            })}
        </div>
    }
}

/// 步骤标题，可选返回登录的箭头
#[component]
pub fn StepHeader(
    wizard: WizardHandle,
    title: &'static str,
    #[prop(optional)] back: bool,
) -> impl IntoView {
    view! {
        <div class="flex items-center gap-2 mb-2">
            {back.then(|| view! {
                <button
                    type="button"
                    class="btn btn-ghost btn-sm btn-circle"
                    aria-label="Back to login"
                    on:click=move |_| wizard.return_to_login()
                >
                    <ArrowLeft attr:class="h-4 w-4" />
                </button>
            })}
            <h2 class="text-lg font-medium">{title}</h2>
        </div>
    }
}

/// 提交按钮；提交中显示加载指示器
#[component]
pub fn SubmitButton(
    wizard: WizardHandle,
    label: &'static str,
    busy_label: &'static str,
    /// 额外的禁用条件
    #[prop(optional, into)]
    disabled: Option<Signal<bool>>,
) -> impl IntoView {
    let is_disabled = move || wizard.is_submitting() || disabled.is_some_and(|d| d.get());

    view! {
        <div class="form-control mt-4">
            <button type="submit" class="btn btn-primary" disabled=is_disabled>
                {move || if wizard.is_submitting() {
                    view! { <span class="loading loading-spinner"></span> {busy_label} }.into_any()
                } else {
                    label.into_any()
                }}
            </button>
        </div>
    }
}

/// "Already have an account? Log in"
#[component]
pub fn LoginLink(wizard: WizardHandle) -> impl IntoView {
    view! {
        <div class="text-center text-sm mt-4">
            <span>"Already have an account? "</span>
            <button type="button" class="link link-primary font-semibold" on:click=move |_| wizard.return_to_login()>
                "Log in"
            </button>
        </div>
    }
}
