//! 自动消失的提示框

use std::time::Duration;

use leptos::prelude::*;

use crate::flow::notice::{NOTICE_AUTO_DISMISS_MS, Notice};

/// 屏幕级通知
///
/// 每条通知带有递增序号，定时器只清除自己显示的那一条。
#[derive(Clone, Copy)]
pub struct Notifier {
    current: RwSignal<Option<(u64, Notice)>>,
    seq: StoredValue<u64>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            current: RwSignal::new(None),
            seq: StoredValue::new(0),
        }
    }

    pub fn show(&self, notice: Notice) {
        let id = self.seq.get_value() + 1;
        self.seq.set_value(id);
        self.current.set(Some((id, notice)));

        let current = self.current;
        set_timeout(
            move || {
                current.try_update(|shown| {
                    if matches!(shown, Some((shown_id, _)) if *shown_id == id) {
                        *shown = None;
                    }
                });
            },
            Duration::from_millis(u64::from(NOTICE_AUTO_DISMISS_MS)),
        );
    }

    pub fn dismiss(&self) {
        self.current.set(None);
    }

    fn notice(&self) -> Option<Notice> {
        self.current.with(|shown| shown.as_ref().map(|(_, n)| n.clone()))
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

pub fn provide_notifier() -> Notifier {
    let notifier = Notifier::new();
    provide_context(notifier);
    notifier
}

pub fn use_notifier() -> Notifier {
    use_context::<Notifier>().expect("Notifier should be provided")
}

#[component]
pub fn Toast(notifier: Notifier) -> impl IntoView {
    move || {
        notifier.notice().map(|notice| {
            view! {
                <div class="toast toast-top toast-end z-50">
                    <div role="alert" class=format!("alert {} shadow-lg", notice.severity.alert_class())>
                        <span>{notice.message}</span>
                        <button class="btn btn-ghost btn-xs" on:click=move |_| notifier.dismiss()>
                            "✕"
                        </button>
                    </div>
                </div>
            }
        })
    }
}
