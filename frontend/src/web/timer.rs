//! 定时器封装模块
//!
//! 使用 `web_sys` 的原生 `setTimeout` API，提供一次性定时器与防抖器。

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

/// 一次性定时器
///
/// 封装 `setTimeout` API。当 `Timeout` 在触发前被 drop 时，自动取消定时器。
pub struct Timeout {
    handle: i32,
    #[allow(dead_code)]
    closure: Closure<dyn FnMut()>,
}

impl Timeout {
    /// 创建新的一次性定时器
    ///
    /// # 参数
    /// - `millis`: 延迟时间（毫秒）
    /// - `callback`: 到期后执行的回调函数
    pub fn new<F>(millis: u32, callback: F) -> Result<Self, JsValue>
    where
        F: FnOnce() + 'static,
    {
        let mut callback = Some(callback);
        let closure = Closure::<dyn FnMut()>::new(move || {
            if let Some(callback) = callback.take() {
                callback();
            }
        });
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("无法获取 window 对象"))?;

        let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            i32::try_from(millis).unwrap_or(i32::MAX),
        )?;

        Ok(Self { handle, closure })
    }

    /// 取消定时器
    ///
    /// 通常不需要手动调用，因为 drop 时会自动清除；对已触发的定时器无效果。
    pub fn cancel(&self) {
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(self.handle);
        }
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// 防抖器
///
/// 每次 `schedule` 都会取消上一次尚未触发的回调，只有静默 `millis` 毫秒后
/// 最后一次调度的回调才会执行。
pub struct Debouncer {
    millis: u32,
    pending: RefCell<Option<Timeout>>,
}

impl Debouncer {
    pub fn new(millis: u32) -> Self {
        Self {
            millis,
            pending: RefCell::new(None),
        }
    }

    pub fn schedule<F>(&self, callback: F)
    where
        F: FnOnce() + 'static,
    {
        // 先 drop 旧定时器（即取消），再挂上新的
        self.pending.borrow_mut().take();
        match Timeout::new(self.millis, callback) {
            Ok(timeout) => *self.pending.borrow_mut() = Some(timeout),
            Err(e) => log::error!("[Search] 设置防抖定时器失败: {:?}", e),
        }
    }

    /// 取消尚未触发的回调
    pub fn cancel(&self) {
        self.pending.borrow_mut().take();
    }
}
