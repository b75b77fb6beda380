//! 向导句柄
//!
//! 将向导状态、通知与注册服务整合为 `WizardHandle`，负责：
//! - 提交状态的进入与结算
//! - 事件派发
//! - 结算结果到通知的转换

use std::rc::Rc;

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;

use crate::api::{SignupApi, use_signup_api};
use crate::components::notification::{Notifier, use_notifier};
use crate::flow::notice::Notice;
use crate::flow::validation::{Field, FieldErrors};
use crate::flow::wizard::{Outcome, Transition, WizardEvent, WizardState, WizardStep};

/// 各步骤组件共享的句柄
///
/// 所有字段都是 `Copy` 的响应式句柄，可以直接作为 Props 传递。
#[derive(Clone, Copy)]
pub struct WizardHandle {
    pub state: RwSignal<WizardState>,
    notifier: Notifier,
    api: StoredValue<Rc<dyn SignupApi>, LocalStorage>,
}

impl WizardHandle {
    /// 需要在 Notifier 与 SignupContext 已提供的组件内调用
    pub fn new() -> Self {
        Self {
            state: RwSignal::new(WizardState::new()),
            notifier: use_notifier(),
            api: StoredValue::new_local(use_signup_api()),
        }
    }

    pub fn api(&self) -> Rc<dyn SignupApi> {
        self.api.get_value()
    }

    pub fn step(&self) -> WizardStep {
        self.state.with(|w| w.step)
    }

    pub fn is_submitting(&self) -> bool {
        self.state.with(|w| w.is_submitting)
    }

    pub fn notify(&self, notice: Notice) {
        self.notifier.show(notice);
    }

    /// 开始提交，返回结算时需要带回的 generation；已有提交进行中时返回 None
    pub fn begin_submit(&self) -> Option<u64> {
        self.state.try_update(|w| w.begin_submit()).flatten()
    }

    pub fn finish_submit(&self, generation: u64) {
        self.state.try_update(|w| w.finish_submit(generation));
    }

    /// 结算提交结果：展示通知并返回字段错误
    pub fn settle(&self, generation: u64, outcome: Outcome) -> FieldErrors {
        let feedback = self
            .state
            .try_update(|w| w.settle(generation, outcome))
            .unwrap_or_default();
        if let Some(notice) = feedback.notice {
            self.notifier.show(notice);
        }
        feedback.field_errors
    }

    /// 派发一个不涉及请求的事件（按钮、链接）
    pub fn dispatch(&self, event: WizardEvent) -> Option<Transition> {
        match self.state.try_update(|w| w.dispatch(event))? {
            Ok(transition) => Some(transition),
            Err(e) => {
                log::warn!("[Flow] {}", e);
                None
            }
        }
    }

    pub fn return_to_login(&self) {
        self.dispatch(WizardEvent::ReturnToLogin);
    }
}

/// 单步表单的字段错误
///
/// 字段被编辑时清除自身错误；`live` 字段在每次输入时重新校验。
#[derive(Clone, Copy)]
pub struct StepErrors(pub RwSignal<FieldErrors>);

impl StepErrors {
    pub fn new() -> Self {
        Self(RwSignal::new(FieldErrors::new()))
    }

    pub fn get(&self, field: Field) -> Option<String> {
        self.0.with(|e| e.get(field).map(str::to_string))
    }

    pub fn replace(&self, errors: FieldErrors) {
        let _ = self.0.try_set(errors);
    }

    pub fn update(&self, field: Field, message: Option<&str>) {
        self.0.update(|e| e.update(field, message));
    }

    pub fn clear(&self, field: Field) {
        self.0.update(|e| e.clear(field));
    }
}
