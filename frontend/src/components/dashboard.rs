use crate::auth::use_auth;
use crate::components::icons::*;
use crate::components::layout::MainLayout;
use crate::web::route::{AppRoute, OrderFilter};
use crate::web::router::{Link, use_navigate};
use leptos::prelude::*;

/// 控制面板上的一张入口卡片
struct DashboardCard {
    title: &'static str,
    description: &'static str,
    route: AppRoute,
    highlighted: bool,
    icon: fn() -> AnyView,
}

fn cards() -> [DashboardCard; 4] {
    [
        DashboardCard {
            title: "Order Now",
            description: "Create a new DAFO order",
            route: AppRoute::NewOrder,
            highlighted: true,
            icon: || view! { <ShoppingCart attr:class="h-8 w-8" /> }.into_any(),
        },
        DashboardCard {
            title: "Orders",
            description: "See real-time status of your orders",
            route: AppRoute::Orders(OrderFilter::All),
            highlighted: false,
            icon: || view! { <ClipboardList attr:class="h-8 w-8" /> }.into_any(),
        },
        DashboardCard {
            title: "Resume Draft",
            description: "Continue a saved order",
            route: AppRoute::Orders(OrderFilter::Draft),
            highlighted: false,
            icon: || view! { <FilePen attr:class="h-8 w-8" /> }.into_any(),
        },
        DashboardCard {
            title: "Manage Templates",
            description: "Preload customizations to speed up orders",
            route: AppRoute::Templates,
            highlighted: false,
            icon: || view! { <LayoutTemplate attr:class="h-8 w-8" /> }.into_any(),
        },
    ]
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let auth = use_auth();
    let navigate = use_navigate();

    let greeting = move || {
        auth.state
            .with(|s| s.user.as_ref().map(|u| format!("Welcome, {}", u.name)))
            .unwrap_or_else(|| "Welcome".to_string())
    };

    view! {
        <MainLayout>
            <div class="space-y-6">
                <h2 class="text-2xl font-bold">{greeting}</h2>

                <div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-6">
                    {cards()
                        .into_iter()
                        .map(|card| {
                            let navigate = navigate.clone();
                            let target = card.route.to_path();
                            let card_class = if card.highlighted {
                                "card bg-primary text-primary-content shadow-xl cursor-pointer hover:shadow-2xl transition-shadow"
                            } else {
                                "card bg-base-100 shadow-xl cursor-pointer hover:shadow-2xl transition-shadow"
                            };
                            view! {
                                <div class=card_class on:click=move |_| navigate(target)>
                                    <div class="card-body">
                                        {(card.icon)()}
                                        <h3 class="card-title">{card.title}</h3>
                                        <p class="text-sm opacity-80">{card.description}</p>
                                        <div class="card-actions justify-end">
                                            <ChevronRight attr:class="h-5 w-5" />
                                        </div>
                                    </div>
                                </div>
                            }
                        })
                        .collect_view()}
                </div>
            </div>
        </MainLayout>
    }
}

/// 订单管理相关路由的占位页面
#[component]
pub fn OrdersPlaceholderPage(route: AppRoute) -> impl IntoView {
    view! {
        <MainLayout>
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body items-center text-center py-16">
                    <h2 class="card-title text-2xl">{route.title()}</h2>
                    <p class="text-base-content/70">"This section is coming soon."</p>
                    <div class="card-actions mt-4">
                        <Link to=AppRoute::Dashboard.to_path() class="btn btn-primary">
                            "Back to Dashboard"
                        </Link>
                    </div>
                </div>
            </div>
        </MainLayout>
    }
}
