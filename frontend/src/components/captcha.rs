//! Cloudflare Turnstile 人机验证组件
//!
//! 脚本由 index.html 以 `render=explicit` 方式加载，这里只负责渲染与移除。

use leptos::html::Div;
use leptos::prelude::*;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::AppConfig;
use crate::flow::captcha::CaptchaState;
use crate::serde_helper::{self, JsErrorInfo};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = turnstile, js_name = render, catch)]
    fn turnstile_render(container: &web_sys::HtmlElement, options: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(js_namespace = turnstile, js_name = remove, catch)]
    fn turnstile_remove(widget_id: &str) -> Result<(), JsValue>;
}

#[derive(Serialize)]
struct TurnstileOptions<'a> {
    sitekey: &'a str,
    theme: &'a str,
}

fn render_widget(
    container: &web_sys::HtmlElement,
    site_key: &str,
    captcha: RwSignal<CaptchaState>,
) -> Result<String, serde_helper::Error> {
    let options = serde_helper::to_value(&TurnstileOptions {
        sitekey: site_key,
        theme: "light",
    })?;

    let on_success = Closure::<dyn Fn(String)>::new(move |token: String| {
        captcha.try_update(|c| c.on_success(token));
    });
    let on_invalidated = Closure::<dyn Fn()>::new(move || {
        captcha.try_update(|c| c.on_invalidated());
    });
    let on_invalidated = on_invalidated.into_js_value();
    serde_helper::set_property(&options, "callback", &on_success.into_js_value())?;
    serde_helper::set_property(&options, "error-callback", &on_invalidated)?;
    serde_helper::set_property(&options, "expired-callback", &on_invalidated)?;

    let widget_id = turnstile_render(container, &options).map_err(serde_helper::Error::JsSys)?;
    Ok(widget_id.as_string().unwrap_or_default())
}

fn remove_widget(widget_id: &str) {
    if let Err(e) = turnstile_remove(widget_id) {
        log::warn!("[Flow] 移除 Turnstile 组件失败: {}", JsErrorInfo::from_js(&e).message);
    }
}

/// "Verify you are human" 勾选框与验证组件
#[component]
pub fn HumanVerification(
    captcha: RwSignal<CaptchaState>,
    /// 字段错误（例如未完成验证就提交）
    #[prop(into)]
    error: Signal<Option<String>>,
) -> impl IntoView {
    let site_key = use_context::<AppConfig>()
        .map(|config| config.turnstile_site_key)
        .unwrap_or_default();

    let container = NodeRef::<Div>::new();
    let widget_id = StoredValue::new(None::<String>);

    let take_widget = move || widget_id.try_update_value(Option::take).flatten();

    Effect::new(move |_| {
        let shown = captcha.with(|c| c.shown);
        let Some(el) = container.get() else {
            return;
        };

        if !shown {
            if let Some(id) = take_widget() {
                remove_widget(&id);
            }
            return;
        }
        if widget_id.with_value(Option::is_some) {
            return;
        }
        match render_widget(&el, &site_key, captcha) {
            Ok(id) => widget_id.set_value(Some(id)),
            Err(e) => log::error!("[Flow] 渲染 Turnstile 组件失败: {}", e),
        }
    });

    on_cleanup(move || {
        if let Some(id) = take_widget() {
            remove_widget(&id);
        }
    });

    view! {
        <div class="form-control">
            <label class="label cursor-pointer justify-start gap-3">
                <input
                    type="checkbox"
                    class="checkbox checkbox-primary checkbox-sm"
                    prop:checked=move || captcha.with(|c| c.shown)
                    on:change=move |ev| {
                        let checked = event_target_checked(&ev);
                        captcha.update(|c| c.set_shown(checked));
                    }
                />
                <span class="label-text">"Verify you are human"</span>
            </label>
            <div node_ref=container class=move || if captcha.with(|c| c.shown) { "mt-2" } else { "hidden" }></div>
            {move || error.get().map(|msg| view! {
                <span class="text-error text-xs mt-1">{msg}</span>
            })}
        </div>
    }
}
