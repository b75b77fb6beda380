//! 登录 / 注册向导状态机
//!
//! 任一时刻只有一个步骤处于活动状态。回到登录步骤等同于完全重置，
//! 前向步骤的数据只通过显式字段（`customer_id`、`otp_email`）传递。
//! 每次重置都会推进 `generation`，重置前发出的提交结果一律丢弃。

use std::fmt;

use super::notice::Notice;
use super::validation::FieldErrors;

/// 连续校验失败达到该次数后提供 "Request New Account"
pub const NEW_ACCOUNT_OFFER_THRESHOLD: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum WizardStep {
    #[default]
    LoginEmailEntry,
    AccountValidation,
    NameSearch,
    SignupDetails,
    OtpVerification,
    SignupSuccess,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        WizardStep::LoginEmailEntry,
        WizardStep::AccountValidation,
        WizardStep::NameSearch,
        WizardStep::SignupDetails,
        WizardStep::OtpVerification,
        WizardStep::SignupSuccess,
    ];
}

/// 触发状态迁移的事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardEvent {
    /// 登录页提交了有效邮箱
    LoginSubmitted { email: String },
    /// 点击 "Sign Up"
    SignUpRequested,
    /// 服务端确认账户有效且活跃
    AccountValidated { customer_id: String },
    /// 服务端拒绝账户
    AccountRejected { offer_new_account: bool },
    /// 选中已有联系人并完成关联
    ContactLinked,
    /// 点击 "Register as New"
    RegisterAsNew,
    /// 注册详情提交成功，验证码已发往该邮箱
    DetailsSubmitted { email: String },
    OtpVerified,
    /// "Log in" / "Go to Login" / 返回箭头
    ReturnToLogin,
}

/// 迁移结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Goto(WizardStep),
    /// 离开应用跳转到身份提供方
    Redirect,
}

/// 迁移表：对每个（步骤，事件）最多只有一个结果
pub fn transition(step: WizardStep, event: &WizardEvent) -> Option<Transition> {
    use WizardEvent as E;
    use WizardStep as S;

    let next = match (step, event) {
        (S::LoginEmailEntry, E::LoginSubmitted { .. }) => return Some(Transition::Redirect),
        (S::LoginEmailEntry, E::SignUpRequested) => S::AccountValidation,
        (S::AccountValidation, E::AccountValidated { .. }) => S::NameSearch,
        (S::AccountValidation, E::AccountRejected { .. }) => S::AccountValidation,
        (S::NameSearch, E::ContactLinked) => S::SignupSuccess,
        (S::NameSearch, E::RegisterAsNew) => S::SignupDetails,
        (S::SignupDetails, E::DetailsSubmitted { .. }) => S::OtpVerification,
        (S::OtpVerification, E::OtpVerified) => S::SignupSuccess,
        (S::LoginEmailEntry, E::ReturnToLogin) => return None,
        (_, E::ReturnToLogin) => S::LoginEmailEntry,
        _ => return None,
    };
    Some(Transition::Goto(next))
}

/// 当前步骤不接受该事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTransition {
    pub step: WizardStep,
    pub event: WizardEvent,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "步骤 {:?} 不接受事件 {:?}", self.step, self.event)
    }
}

impl std::error::Error for InvalidTransition {}

// =========================================================
// 提交结果
// =========================================================

/// 一次提交的结果（由 `submit` 模块产生）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 本地校验失败，请求未发出
    Invalid(FieldErrors),
    /// 服务端接受
    Accepted(WizardEvent),
    /// 服务端明确拒绝（例如账户无效）
    Rejected {
        event: WizardEvent,
        notice: Notice,
        field_errors: FieldErrors,
    },
    /// 请求失败（网络、服务端错误）
    Failed(Notice),
}

/// 提交结束后需要展示给用户的反馈
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feedback {
    pub notice: Option<Notice>,
    pub field_errors: FieldErrors,
    pub transition: Option<Transition>,
}

// =========================================================
// 向导状态
// =========================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WizardState {
    pub step: WizardStep,
    pub customer_id: Option<String>,
    pub otp_email: Option<String>,
    pub failed_validations: u32,
    pub server_offers_new_account: bool,
    pub is_submitting: bool,
    /// 重置次数；提交开始时记录，结算时比对
    pub generation: u64,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 应用事件；不合法的事件不改变状态
    pub fn dispatch(&mut self, event: WizardEvent) -> Result<Transition, InvalidTransition> {
        let Some(next) = transition(self.step, &event) else {
            return Err(InvalidTransition {
                step: self.step,
                event,
            });
        };

        if let Transition::Goto(step) = next {
            if step == WizardStep::LoginEmailEntry {
                self.reset();
                return Ok(next);
            }

            match event {
                WizardEvent::SignUpRequested => {
                    // 重新进入注册流程时丢弃之前的数据
                    self.reset();
                }
                WizardEvent::AccountValidated { customer_id } => {
                    self.customer_id = Some(customer_id);
                }
                WizardEvent::AccountRejected { offer_new_account } => {
                    self.failed_validations += 1;
                    self.server_offers_new_account |= offer_new_account;
                }
                WizardEvent::DetailsSubmitted { email } => {
                    self.otp_email = Some(email);
                }
                _ => {}
            }
            self.step = step;
        }
        Ok(next)
    }

    /// 清空所有步骤数据，并作废进行中的提交
    fn reset(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }

    /// 是否显示 "Request New Account"
    pub fn offers_new_account(&self) -> bool {
        self.failed_validations >= NEW_ACCOUNT_OFFER_THRESHOLD || self.server_offers_new_account
    }

    /// 开始提交，返回本次提交所属的 generation；
    /// 已在提交中时返回 None，调用方应放弃本次提交
    pub fn begin_submit(&mut self) -> Option<u64> {
        if self.is_submitting {
            return None;
        }
        self.is_submitting = true;
        Some(self.generation)
    }

    /// 结束提交；向导在此期间被重置过则什么也不做
    pub fn finish_submit(&mut self, generation: u64) {
        if generation == self.generation {
            self.is_submitting = false;
        }
    }

    /// 结算一次提交：复位提交状态，成功时推进步骤
    ///
    /// 提交之后向导被重置过，结果属于已丢弃的会话，直接忽略。
    pub fn settle(&mut self, generation: u64, outcome: Outcome) -> Feedback {
        if generation != self.generation {
            log::warn!(
                "[Flow] 丢弃已重置会话的提交结果 (generation {} / 当前 {})",
                generation,
                self.generation
            );
            return Feedback::default();
        }
        self.is_submitting = false;

        match outcome {
            Outcome::Invalid(field_errors) => Feedback {
                field_errors,
                ..Default::default()
            },
            Outcome::Accepted(event) => self.apply(event, None, FieldErrors::new()),
            Outcome::Rejected {
                event,
                notice,
                field_errors,
            } => self.apply(event, Some(notice), field_errors),
            Outcome::Failed(notice) => Feedback {
                notice: Some(notice),
                ..Default::default()
            },
        }
    }

    fn apply(&mut self, event: WizardEvent, notice: Option<Notice>, field_errors: FieldErrors) -> Feedback {
        match self.dispatch(event) {
            Ok(transition) => Feedback {
                notice,
                field_errors,
                transition: Some(transition),
            },
            Err(e) => {
                // 提交期间用户已离开该步骤，迟到的结果直接丢弃
                log::warn!("[Flow] 丢弃迟到的提交结果: {}", e);
                Feedback::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::validation::{Field, MSG_ACCOUNT_INVALID};

    fn all_events() -> Vec<WizardEvent> {
        vec![
            WizardEvent::LoginSubmitted {
                email: "a@b.co".to_string(),
            },
            WizardEvent::SignUpRequested,
            WizardEvent::AccountValidated {
                customer_id: "X".to_string(),
            },
            WizardEvent::AccountRejected {
                offer_new_account: false,
            },
            WizardEvent::ContactLinked,
            WizardEvent::RegisterAsNew,
            WizardEvent::DetailsSubmitted {
                email: "a@b.co".to_string(),
            },
            WizardEvent::OtpVerified,
            WizardEvent::ReturnToLogin,
        ]
    }

    fn at(step: WizardStep) -> WizardState {
        WizardState {
            step,
            ..Default::default()
        }
    }

    #[test]
    fn test_transition_table() {
        use WizardStep as S;
        let expected = [
            (S::LoginEmailEntry, "LoginSubmitted", Some(Transition::Redirect)),
            (S::LoginEmailEntry, "SignUpRequested", Some(Transition::Goto(S::AccountValidation))),
            (S::AccountValidation, "AccountValidated", Some(Transition::Goto(S::NameSearch))),
            (S::AccountValidation, "AccountRejected", Some(Transition::Goto(S::AccountValidation))),
            (S::AccountValidation, "ReturnToLogin", Some(Transition::Goto(S::LoginEmailEntry))),
            (S::NameSearch, "ContactLinked", Some(Transition::Goto(S::SignupSuccess))),
            (S::NameSearch, "RegisterAsNew", Some(Transition::Goto(S::SignupDetails))),
            (S::NameSearch, "ReturnToLogin", Some(Transition::Goto(S::LoginEmailEntry))),
            (S::SignupDetails, "DetailsSubmitted", Some(Transition::Goto(S::OtpVerification))),
            (S::SignupDetails, "ReturnToLogin", Some(Transition::Goto(S::LoginEmailEntry))),
            (S::OtpVerification, "OtpVerified", Some(Transition::Goto(S::SignupSuccess))),
            (S::OtpVerification, "ReturnToLogin", Some(Transition::Goto(S::LoginEmailEntry))),
            (S::SignupSuccess, "ReturnToLogin", Some(Transition::Goto(S::LoginEmailEntry))),
        ];

        // 表外的（步骤，事件）组合一律不接受
        for step in WizardStep::ALL {
            for event in all_events() {
                let name = format!("{:?}", event);
                let name = name.split([' ', '{']).next().unwrap_or_default().to_string();
                let want = expected
                    .iter()
                    .find(|(s, e, _)| *s == step && *e == name)
                    .and_then(|(_, _, t)| t.clone());
                assert_eq!(transition(step, &event), want, "{:?} + {}", step, name);
            }
        }
    }

    #[test]
    fn test_customer_id_threads_forward() {
        let mut state = at(WizardStep::AccountValidation);
        state
            .dispatch(WizardEvent::AccountValidated {
                customer_id: "X".to_string(),
            })
            .unwrap();
        assert_eq!(state.step, WizardStep::NameSearch);
        assert_eq!(state.customer_id.as_deref(), Some("X"));

        state.dispatch(WizardEvent::RegisterAsNew).unwrap();
        assert_eq!(state.step, WizardStep::SignupDetails);
        assert_eq!(state.customer_id.as_deref(), Some("X"));
    }

    #[test]
    fn test_return_to_login_is_full_reset() {
        let mut state = WizardState {
            step: WizardStep::OtpVerification,
            customer_id: Some("X".to_string()),
            otp_email: Some("a@b.co".to_string()),
            failed_validations: 2,
            server_offers_new_account: true,
            is_submitting: true,
            generation: 4,
        };
        state.dispatch(WizardEvent::ReturnToLogin).unwrap();
        assert_eq!(
            state,
            WizardState {
                generation: 5,
                ..WizardState::new()
            }
        );
    }

    #[test]
    fn test_invalid_event_leaves_state_unchanged() {
        let mut state = at(WizardStep::NameSearch);
        let err = state.dispatch(WizardEvent::OtpVerified).unwrap_err();
        assert_eq!(err.step, WizardStep::NameSearch);
        assert_eq!(state, at(WizardStep::NameSearch));
    }

    #[test]
    fn test_new_account_offer_after_three_rejections() {
        let mut state = at(WizardStep::AccountValidation);
        for _ in 0..2 {
            state
                .dispatch(WizardEvent::AccountRejected {
                    offer_new_account: false,
                })
                .unwrap();
            assert!(!state.offers_new_account());
        }
        state
            .dispatch(WizardEvent::AccountRejected {
                offer_new_account: false,
            })
            .unwrap();
        assert_eq!(state.failed_validations, 3);
        assert!(state.offers_new_account());
        assert_eq!(state.step, WizardStep::AccountValidation);
    }

    #[test]
    fn test_server_can_offer_new_account_immediately() {
        let mut state = at(WizardStep::AccountValidation);
        state
            .dispatch(WizardEvent::AccountRejected {
                offer_new_account: true,
            })
            .unwrap();
        assert!(state.offers_new_account());
    }

    #[test]
    fn test_submit_guard() {
        let mut state = WizardState::new();
        let generation = state.begin_submit().unwrap();
        assert!(state.begin_submit().is_none());
        state.finish_submit(generation);
        assert!(state.begin_submit().is_some());
    }

    #[test]
    fn test_outcome_from_reset_session_is_ignored() {
        let mut state = WizardState::new();
        state.dispatch(WizardEvent::SignUpRequested).unwrap();
        let old = state.begin_submit().unwrap();

        // 请求在途时回到登录，再重新注册并提交
        state.dispatch(WizardEvent::ReturnToLogin).unwrap();
        state.dispatch(WizardEvent::SignUpRequested).unwrap();
        let current = state.begin_submit().unwrap();
        assert_ne!(old, current);

        let feedback = state.settle(
            old,
            Outcome::Accepted(WizardEvent::AccountValidated {
                customer_id: "OLD".to_string(),
            }),
        );
        assert_eq!(feedback, Feedback::default());
        assert_eq!(state.step, WizardStep::AccountValidation);
        assert_eq!(state.customer_id, None);
        assert!(state.is_submitting);

        state.finish_submit(old);
        assert!(state.is_submitting);

        let feedback = state.settle(
            current,
            Outcome::Accepted(WizardEvent::AccountValidated {
                customer_id: "NEW".to_string(),
            }),
        );
        assert_eq!(feedback.transition, Some(Transition::Goto(WizardStep::NameSearch)));
        assert_eq!(state.customer_id.as_deref(), Some("NEW"));
        assert!(!state.is_submitting);
    }

    #[test]
    fn test_settle_failure_resets_submitting_without_advancing() {
        let mut state = at(WizardStep::SignupDetails);
        let generation = state.begin_submit().unwrap();

        let feedback = state.settle(generation, Outcome::Failed(Notice::error("Request failed")));
        assert!(!state.is_submitting);
        assert_eq!(state.step, WizardStep::SignupDetails);
        assert_eq!(feedback.notice, Some(Notice::error("Request failed")));
        assert_eq!(feedback.transition, None);
    }

    #[test]
    fn test_settle_rejection_reports_field_errors() {
        let mut state = at(WizardStep::AccountValidation);
        let generation = state.begin_submit().unwrap();

        let feedback = state.settle(generation, Outcome::Rejected {
            event: WizardEvent::AccountRejected {
                offer_new_account: false,
            },
            notice: Notice::error("Invalid Account Number or Billing Zip Code."),
            field_errors: FieldErrors::single(Field::AccountNumber, MSG_ACCOUNT_INVALID),
        });
        assert_eq!(
            feedback.field_errors.get(Field::AccountNumber),
            Some(MSG_ACCOUNT_INVALID)
        );
        assert_eq!(state.failed_validations, 1);
        assert!(!state.is_submitting);
    }

    #[test]
    fn test_settle_after_leaving_step_is_dropped() {
        let mut state = at(WizardStep::LoginEmailEntry);
        let feedback = state.settle(0, Outcome::Accepted(WizardEvent::OtpVerified));
        assert_eq!(feedback, Feedback::default());
        assert_eq!(state.step, WizardStep::LoginEmailEntry);
    }
}
