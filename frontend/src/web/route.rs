//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、访问规则及守卫决策。

use std::fmt::Display;

/// 订单列表的筛选条件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderFilter {
    #[default]
    All,
    Draft,
}

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 登录页面 (公开路由)
    #[default]
    Login,
    /// 控制面板 (需要认证)
    Dashboard,
    NewOrder,
    Orders(OrderFilter),
    Templates,
}

/// 守卫决策
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// 渲染目标路由
    Render(AppRoute),
    /// 替换当前历史记录并跳转
    Redirect(AppRoute),
}

impl AppRoute {
    /// 将 URL 解析为路由枚举
    ///
    /// `path` 可以携带查询串；未匹配的路径返回 `None`。
    pub fn from_path(path: &str) -> Option<Self> {
        let (path, query) = path.split_once('?').unwrap_or((path, ""));
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };

        let route = match path {
            "/" | "/login" => Self::Login,
            "/dashboard" => Self::Dashboard,
            "/new-order" => Self::NewOrder,
            "/orders" => Self::Orders(parse_order_filter(query)),
            "/templates" => Self::Templates,
            _ => return None,
        };
        Some(route)
    }

    /// 未匹配的路径一律按登录页处理
    pub fn from_path_or_login(path: &str) -> Self {
        Self::from_path(path).unwrap_or(Self::Login)
    }

    /// 获取路由对应的 URL
    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Dashboard => "/dashboard",
            Self::NewOrder => "/new-order",
            Self::Orders(OrderFilter::All) => "/orders",
            Self::Orders(OrderFilter::Draft) => "/orders?filter=Draft",
            Self::Templates => "/templates",
        }
    }

    /// 面包屑 / 页面标题
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Dashboard => "Dashboard",
            Self::NewOrder => "New Order",
            Self::Orders(OrderFilter::All) => "Orders",
            Self::Orders(OrderFilter::Draft) => "Draft Orders",
            Self::Templates => "Templates",
        }
    }

    /// 主布局中的面包屑
    pub fn breadcrumb(&self) -> Vec<&'static str> {
        match self {
            Self::Login => Vec::new(),
            Self::Dashboard => vec!["Home"],
            other => vec!["Home", other.title()],
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        !self.is_public()
    }

    /// 公开路由：已认证用户不应停留
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login)
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从公开路由）
    pub fn auth_success_redirect() -> Self {
        Self::Dashboard
    }

    /// 在认证状态已确定的前提下决定渲染还是重定向
    pub fn guard(self, is_authenticated: bool) -> GuardDecision {
        if self.requires_auth() && !is_authenticated {
            GuardDecision::Redirect(Self::auth_failure_redirect())
        } else if self.is_public() && is_authenticated {
            GuardDecision::Redirect(Self::auth_success_redirect())
        } else {
            GuardDecision::Render(self)
        }
    }
}

fn parse_order_filter(query: &str) -> OrderFilter {
    let is_draft = url::form_urlencoded::parse(query.as_bytes())
        .any(|(key, value)| key == "filter" && value.eq_ignore_ascii_case("draft"));
    if is_draft {
        OrderFilter::Draft
    } else {
        OrderFilter::All
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breadcrumb() {
        assert!(AppRoute::Login.breadcrumb().is_empty());
        assert_eq!(AppRoute::Dashboard.breadcrumb(), vec!["Home"]);
        assert_eq!(
            AppRoute::Orders(OrderFilter::Draft).breadcrumb(),
            vec!["Home", "Draft Orders"]
        );
    }

    #[test]
    fn test_root_and_login_map_to_login() {
        assert_eq!(AppRoute::from_path("/"), Some(AppRoute::Login));
        assert_eq!(AppRoute::from_path("/login"), Some(AppRoute::Login));
        assert_eq!(AppRoute::from_path("/login/"), Some(AppRoute::Login));
    }

    #[test]
    fn test_order_routes() {
        assert_eq!(
            AppRoute::from_path("/orders"),
            Some(AppRoute::Orders(OrderFilter::All))
        );
        assert_eq!(
            AppRoute::from_path("/orders?filter=Draft"),
            Some(AppRoute::Orders(OrderFilter::Draft))
        );
        assert_eq!(AppRoute::from_path("/new-order"), Some(AppRoute::NewOrder));
        assert_eq!(AppRoute::from_path("/templates"), Some(AppRoute::Templates));
    }

    #[test]
    fn test_unmatched_path_falls_back_to_login() {
        assert_eq!(AppRoute::from_path("/nope"), None);
        assert_eq!(AppRoute::from_path_or_login("/nope"), AppRoute::Login);
    }

    #[test]
    fn test_paths_round_trip() {
        for route in [
            AppRoute::Login,
            AppRoute::Dashboard,
            AppRoute::NewOrder,
            AppRoute::Orders(OrderFilter::All),
            AppRoute::Orders(OrderFilter::Draft),
            AppRoute::Templates,
        ] {
            assert_eq!(AppRoute::from_path(route.to_path()), Some(route));
        }
    }

    #[test]
    fn test_protected_route_redirects_anonymous_user() {
        assert_eq!(
            AppRoute::Dashboard.guard(false),
            GuardDecision::Redirect(AppRoute::Login)
        );
        assert_eq!(
            AppRoute::Orders(OrderFilter::Draft).guard(false),
            GuardDecision::Redirect(AppRoute::Login)
        );
        assert_eq!(
            AppRoute::Templates.guard(true),
            GuardDecision::Render(AppRoute::Templates)
        );
    }

    #[test]
    fn test_public_route_redirects_authenticated_user() {
        assert_eq!(
            AppRoute::Login.guard(true),
            GuardDecision::Redirect(AppRoute::Dashboard)
        );
        assert_eq!(
            AppRoute::Login.guard(false),
            GuardDecision::Render(AppRoute::Login)
        );
    }
}
