//! 联系人联想下拉框
//!
//! 输入防抖后搜索，滚动到列表底部时加载下一页。

use std::rc::Rc;

use leptos::prelude::*;
use leptos::reactive::owner::LocalStorage;
use leptos::task::spawn_local;

use dafonow_shared::ContactRecord;

use crate::api::{SignupApi, use_signup_api};
use crate::components::icons::Search;
use crate::flow::search::{
    ContactOption, InputAction, MIN_QUERY_LENGTH, SearchConfig, SearchSession, SearchTicket,
    fetch_page,
};
use crate::web::timer::Debouncer;

const PLACEHOLDER: &str = "Enter 3+ letters to search";
const NO_RECORDS: &str = "No Records Found";
/// 距底部小于该像素数即视为滚动到底
const SCROLL_THRESHOLD_PX: i32 = 8;

type Session = RwSignal<SearchSession<ContactOption>>;
type ApiHandle = StoredValue<Rc<dyn SignupApi>, LocalStorage>;

fn run_fetch(api: ApiHandle, session: Session, ticket: SearchTicket) {
    spawn_local(async move {
        let api = api.get_value();
        let result = fetch_page(api.as_ref(), &ticket, false, ContactOption::from).await;
        session.try_update(|s| match result {
            Ok(items) => {
                s.apply(&ticket, items);
            }
            Err(e) => {
                log::warn!("[Search] 搜索联系人失败: {}", e);
                s.fail(&ticket);
            }
        });
    });
}

#[component]
pub fn ContactsSearch(
    /// 当前选中的联系人
    selected: RwSignal<Option<ContactRecord>>,
    #[prop(into)] error: Signal<Option<String>>,
) -> impl IntoView {
    let config = SearchConfig::default();
    let api: ApiHandle = StoredValue::new_local(use_signup_api());
    let session: Session = RwSignal::new(SearchSession::new(config));
    let debouncer = StoredValue::new_local(Debouncer::new(config.debounce_ms));

    let (input, set_input) = signal(String::new());
    let (open, set_open) = signal(false);

    let on_input = move |ev| {
        let value = event_target_value(&ev);
        set_input.set(value.clone());
        set_open.set(true);
        selected.set(None);

        match session.try_update(|s| s.input_changed(&value)) {
            Some(InputAction::Schedule) => debouncer.with_value(|d| {
                d.schedule(move || {
                    if let Some(ticket) = session.try_update(|s| s.start_search()).flatten() {
                        run_fetch(api, session, ticket);
                    }
                })
            }),
            _ => debouncer.with_value(|d| d.cancel()),
        }
    };

    let on_scroll = move |ev: leptos::ev::Event| {
        let list = event_target::<web_sys::Element>(&ev);
        let remaining = list.scroll_height() - list.scroll_top() - list.client_height();
        if remaining > SCROLL_THRESHOLD_PX {
            return;
        }
        if let Some(ticket) = session.try_update(|s| s.load_more()).flatten() {
            run_fetch(api, session, ticket);
        }
    };

    let choose = move |option: ContactOption| {
        set_input.set(option.label.clone());
        selected.set(Some(option.record));
        set_open.set(false);
    };

    let empty_text = move || {
        if input.with(|q| q.chars().count() < MIN_QUERY_LENGTH) {
            PLACEHOLDER
        } else {
            NO_RECORDS
        }
    };

    let options = move || {
        session.with(|s| {
            s.results()
                .iter()
                .cloned()
                .map(|option| {
                    let label = option.label.clone();
                    view! {
                        <li>
                            <a on:mousedown=move |ev| {
                                ev.prevent_default();
                                choose(option.clone());
                            }>{label}</a>
                        </li>
                    }
                })
                .collect_view()
        })
    };

    view! {
        <div class="form-control w-full relative">
            <label class="input input-bordered flex items-center gap-2" class:input-error=move || error.with(Option::is_some)>
                <Search attr:class="h-4 w-4 opacity-60" />
                <input
                    type="text"
                    class="grow"
                    placeholder=PLACEHOLDER
                    autocomplete="off"
                    prop:value=input
                    on:input=on_input
                    on:focus=move |_| set_open.set(true)
                    on:blur=move |_| set_open.set(false)
                />
                <Show when=move || session.with(|s| s.is_loading())>
                    <span class="loading loading-spinner loading-xs"></span>
                </Show>
            </label>

            <Show when=move || open.get()>
                <ul
                    class="menu absolute top-full z-40 mt-1 w-full max-h-60 overflow-y-auto flex-nowrap rounded-box bg-base-100 shadow-lg"
                    on:scroll=on_scroll
                >
                    <Show
                        when=move || session.with(|s| !s.results().is_empty())
                        fallback=move || view! {
                            <li class="disabled"><span>{empty_text}</span></li>
                        }
                    >
                        {options}
                    </Show>
                </ul>
            </Show>

            {move || error.get().map(|msg| view! {
                <span class="text-error text-xs mt-1">{msg}</span>
            })}
        </div>
    }
}
