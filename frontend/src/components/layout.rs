//! 页面布局
//!
//! - `AuthLayout`: 登录 / 注册使用的居中卡片
//! - `MainLayout`: 受保护页面使用的顶部导航 + 面包屑

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{logout, use_auth};
use crate::components::icons::{LogOut, ShieldCheck};
use crate::web::route::{AppRoute, OrderFilter};
use crate::web::router::{Link, use_router};

pub const PRODUCT_NAME: &str = "DAFO Now";

const NAV_ITEMS: [(&str, AppRoute); 3] = [
    ("Home", AppRoute::Dashboard),
    ("Orders", AppRoute::Orders(OrderFilter::All)),
    ("Templates", AppRoute::Templates),
];

#[component]
pub fn AuthLayout(children: Children) -> impl IntoView {
    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <div class="flex flex-col items-center gap-2 mb-2">
                    <div class="p-3 bg-primary/10 rounded-2xl text-primary">
                        <ShieldCheck attr:class="h-8 w-8" />
                    </div>
                    <h1 class="text-3xl font-bold">{PRODUCT_NAME}</h1>
                </div>
                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <div class="card-body">{children()}</div>
                </div>
            </div>
        </div>
    }
}

#[component]
fn UserMenu() -> impl IntoView {
    let auth = use_auth();
    let user = move || auth.state.with(|s| s.user.clone());

    let on_logout = move |_| {
        spawn_local(async move {
            if let Err(e) = logout(&auth).await {
                log::error!("[Auth] 注销失败: {}", e);
            }
        });
    };

    view! {
        <div class="dropdown dropdown-end">
            <div tabindex="0" role="button" class="btn btn-ghost gap-2">
                <div class="avatar placeholder">
                    <div class="bg-primary text-primary-content w-8 rounded-full">
                        <span class="text-xs">{move || user().map(|u| u.initials()).unwrap_or_default()}</span>
                    </div>
                </div>
                <div class="hidden md:flex flex-col items-start leading-tight">
                    <span class="text-sm font-semibold">{move || user().map(|u| u.name).unwrap_or_default()}</span>
                    <span class="text-xs opacity-60">{move || user().map(|u| u.organization).unwrap_or_default()}</span>
                </div>
            </div>
            <ul tabindex="0" class="dropdown-content menu z-50 mt-2 w-56 rounded-box bg-base-100 p-2 shadow">
                <li class="menu-title">
                    <span>{move || user().map(|u| u.name).unwrap_or_default()}</span>
                    <span class="font-normal">{move || user().map(|u| u.organization).unwrap_or_default()}</span>
                </li>
                <li>
                    <a class="text-error" on:click=on_logout>
                        <LogOut attr:class="h-4 w-4" /> "Logout"
                    </a>
                </li>
            </ul>
        </div>
    }
}

#[component]
fn Breadcrumb() -> impl IntoView {
    let router = use_router();

    view! {
        <div class="breadcrumbs text-sm mb-4">
            <ul>
                {move || {
                    router
                        .current_route()
                        .get()
                        .breadcrumb()
                        .into_iter()
                        .map(|item| view! { <li>{item}</li> })
                        .collect_view()
                }}
            </ul>
        </div>
    }
}

#[component]
pub fn MainLayout(children: Children) -> impl IntoView {
    let current = use_router().current_route().get_untracked();

    let nav_class = move |route: &AppRoute| {
        if current == *route {
            "btn btn-ghost btn-sm btn-active"
        } else {
            "btn btn-ghost btn-sm"
        }
    };

    view! {
        <div class="min-h-screen flex flex-col bg-base-200 font-sans">
            <div class="navbar bg-base-100 shadow sticky top-0 z-40 px-4 md:px-8">
                <div class="flex-1 gap-4">
                    <Link to=AppRoute::Dashboard.to_path() class="btn btn-ghost text-xl">
                        {PRODUCT_NAME}
                    </Link>
                    <nav class="hidden md:flex gap-1">
                        {NAV_ITEMS
                            .into_iter()
                            .map(|(label, route)| view! {
                                <Link to=route.to_path() class=nav_class(&route)>{label}</Link>
                            })
                            .collect_view()}
                    </nav>
                </div>
                <div class="flex-none">
                    <UserMenu />
                </div>
            </div>

            <main class="flex-1 w-full max-w-7xl mx-auto p-4 md:p-8">
                <Breadcrumb />
                {children()}
            </main>

            <footer class="footer footer-center p-4 text-base-content/70 text-sm">
                <p>"© 2025 CascadeDAFO. All rights reserved."</p>
            </footer>
        </div>
    }
}
