//! Console - 组装 HTTP 客户端、会话、各资源控制器与本地状态

use std::path::Path;
use std::sync::Arc;

use shared::client::{Role, UserInfo};
use shared::models::{
    Admin, Backup, Branch, Brand, Category, Debt, PermissionDef, Product, Report, Resource, Sale,
    Statistics,
};
use shared::{AppError, AppResult};
use tally_client::{HttpClient, RemoteRepository, Scope};

use crate::config::ConsoleConfig;
use crate::controller::ResourceController;
use crate::guard::{Route, RouteGuard};
use crate::notice::{Notice, NoticeBoard};
use crate::refs::ReferenceIndex;
use crate::session::Session;
use crate::state::{PersistedState, StateStore};
use crate::view::ListQuery;

const LIST_ROUTES: &[(&str, Route)] = &[
    (Product::PATH, Route::Products),
    (Category::PATH, Route::Categories),
    (Brand::PATH, Route::Brands),
    (Branch::PATH, Route::Branches),
    (Admin::PATH, Route::Admins),
    (PermissionDef::PATH, Route::Permissions),
    (Sale::PATH, Route::Sales),
    (Debt::PATH, Route::Debts),
    (Report::PATH, Route::Reports),
];

/// Route that shows a resource's list
pub fn route_for(path: &str) -> Route {
    LIST_ROUTES
        .iter()
        .find(|(p, _)| *p == path)
        .map(|(_, route)| *route)
        .unwrap_or(Route::Dashboard)
}

fn controller<R: Resource>(
    http: &HttpClient,
    notices: &NoticeBoard,
    session: &Session,
) -> ResourceController<R> {
    ResourceController::new(Arc::new(RemoteRepository::<R>::new(http.clone())), notices.clone())
        .with_expiry_flag(session.expiry_flag())
}

/// The administration console
pub struct Console {
    http: HttpClient,
    session: Session,
    state_store: StateStore,
    state: PersistedState,
    notices: NoticeBoard,
    configured_scope: Scope,

    pub products: ResourceController<Product>,
    pub categories: ResourceController<Category>,
    pub brands: ResourceController<Brand>,
    pub branches: ResourceController<Branch>,
    pub admins: ResourceController<Admin>,
    pub permissions: ResourceController<PermissionDef>,
    pub sales: ResourceController<Sale>,
    pub debts: ResourceController<Debt>,
    pub reports: ResourceController<Report>,
}

impl Console {
    /// Build the console and restore the persisted session
    pub async fn open(config: &ConsoleConfig) -> AppResult<Self> {
        let state_store = StateStore::new(&config.data_dir);
        let state = match state_store.load() {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(error = %e, path = %state_store.path().display(), "unreadable local state, starting fresh");
                PersistedState::default()
            }
        };

        let client_config = config.client_config(state.settings.auth_scheme);
        let http = HttpClient::new(&client_config).map_err(AppError::from)?;
        let notices = NoticeBoard::new();
        let session = Session::new(http.clone());

        let mut console = Self {
            products: controller(&http, &notices, &session),
            categories: controller(&http, &notices, &session),
            brands: controller(&http, &notices, &session),
            branches: controller(&http, &notices, &session),
            admins: controller(&http, &notices, &session),
            permissions: controller(&http, &notices, &session),
            sales: controller(&http, &notices, &session),
            debts: controller(&http, &notices, &session),
            reports: controller(&http, &notices, &session),
            configured_scope: config.scope(),
            http,
            session,
            state_store,
            state,
            notices,
        };

        let auth = console.state.auth.clone();
        if console.session.restore(auth).await {
            tracing::debug!("session restored");
        }
        console.apply_scope().await;
        Ok(console)
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut PersistedState {
        &mut self.state
    }

    /// Scope headers: configured values first, then the selected branch
    /// and the logged-in user's shop.
    async fn apply_scope(&self) {
        let user = self.session.user();
        let scope = Scope::new(
            self.configured_scope
                .shop_id
                .clone()
                .or_else(|| user.and_then(|u| u.shop_id.clone())),
            self.configured_scope
                .branch
                .clone()
                .or_else(|| self.state.ui.selected_branch.clone())
                .or_else(|| user.and_then(|u| u.branch.clone())),
        );
        self.http.set_scope(scope).await;
    }

    /// Select the branch sent with every request
    pub async fn select_branch(&mut self, branch: Option<String>) {
        self.state.ui.selected_branch = branch;
        self.apply_scope().await;
    }

    // ========== Session ==========

    pub async fn login(&mut self, role: Role, username: &str, password: &str) -> AppResult<UserInfo> {
        let result = self.session.login(role, username, password).await.cloned();
        self.state.auth = self.session.state().clone();
        match result {
            Ok(user) => {
                self.apply_scope().await;
                self.notices
                    .success(format!("Welcome, {}", user.display_name()));
                Ok(user)
            }
            Err(e) => {
                self.notices.error(&e);
                Err(e)
            }
        }
    }

    /// Log out, clear every collection and purge the state file
    ///
    /// A failed server call is reported but does not keep the session.
    pub async fn logout(&mut self) -> AppResult<()> {
        if let Err(e) = self.session.logout().await {
            self.notices.publish(Notice::info(format!(
                "Server logout failed ({}), local session cleared",
                e.message
            )));
        }

        self.products.clear().await;
        self.categories.clear().await;
        self.brands.clear().await;
        self.branches.clear().await;
        self.admins.clear().await;
        self.permissions.clear().await;
        self.sales.clear().await;
        self.debts.clear().await;
        self.reports.clear().await;

        self.state = PersistedState::default();
        self.state_store.purge()?;
        self.apply_scope().await;
        self.notices.success("Logged out");
        Ok(())
    }

    /// Check that the current session may open `route`
    pub async fn require(&mut self, route: Route) -> AppResult<()> {
        if route != Route::Login && self.session.check_expiry().await {
            self.state.auth = self.session.state().clone();
        }
        RouteGuard::require(self.session.state(), route).inspect_err(|e| self.notices.error(e))
    }

    /// Write the local state to disk
    pub fn save(&mut self) -> AppResult<()> {
        self.state.auth = self.session.state().clone();
        self.state_store.save(&self.state)?;
        Ok(())
    }

    // ========== Queries ==========

    /// Last query used for a resource list
    pub fn query_for(&self, path: &str) -> ListQuery {
        let mut query = self.state.ui.query(path);
        if !self.state.ui.queries.contains_key(path) {
            query.per_page = self.state.settings.per_page;
        }
        query
    }

    pub fn remember_query(&mut self, path: &str, query: ListQuery) {
        self.state.ui.remember(path, query);
    }

    /// Products with category and brand names in place of identifiers
    pub async fn products_with_names(&self) -> Vec<Product> {
        let categories = self.categories.snapshot().await;
        let brands = self.brands.snapshot().await;
        let index = ReferenceIndex::new(&categories, &brands);
        self.products
            .snapshot()
            .await
            .iter()
            .map(|p| index.with_names(p))
            .collect()
    }

    // ========== Statistics / Backup ==========

    pub async fn statistics(&mut self) -> AppResult<Statistics> {
        self.require(Route::Statistics).await?;
        self.http
            .statistics()
            .await
            .map_err(|e| self.report(AppError::from(e)))
    }

    /// Download a backup into `path`, returning its row count
    pub async fn backup_to(&mut self, path: &Path) -> AppResult<usize> {
        self.require(Route::Backup).await?;
        let backup = self
            .http
            .backup()
            .await
            .map_err(|e| self.report(AppError::from(e)))?;
        let content = serde_json::to_vec_pretty(&backup)
            .map_err(|e| self.report(AppError::storage(e.to_string())))?;
        std::fs::write(path, content).map_err(|e| {
            self.report(AppError::storage(format!(
                "Failed to write {}: {e}",
                path.display()
            )))
        })?;
        self.notices.success(format!("Backup saved to {}", path.display()));
        Ok(backup.row_count())
    }

    /// Upload a backup file produced by [`Console::backup_to`]
    pub async fn restore_from(&mut self, path: &Path) -> AppResult<String> {
        self.require(Route::Backup).await?;
        let bytes = std::fs::read(path).map_err(|e| {
            self.report(AppError::storage(format!(
                "Failed to read {}: {e}",
                path.display()
            )))
        })?;
        let backup = Backup::from_slice(&bytes).map_err(|e| self.report(e))?;
        let message = self
            .http
            .restore(&backup)
            .await
            .map_err(|e| self.report(AppError::from(e)))?;
        self.notices.success(if message.is_empty() {
            "Backup restored".to_string()
        } else {
            message.clone()
        });
        Ok(message)
    }

    // ========== Cart ==========

    /// Add a product to the cart; products are loaded on first use
    pub async fn cart_add(&mut self, product_id: &str, quantity: i64) -> AppResult<()> {
        self.require(Route::Cart).await?;
        if self.products.is_empty().await {
            self.products.refresh().await?;
        }
        let product = self
            .products
            .get(product_id)
            .await
            .ok_or_else(|| self.report(AppError::missing(Product::NAME, product_id)))?;
        let added = self
            .state
            .cart
            .add(&product, quantity)
            .map(|line| line.quantity);
        let in_cart = added.map_err(|e| self.report(e))?;
        tracing::info!(product = product_id, quantity = in_cart, "cart updated");
        Ok(())
    }

    /// Record a sale for every cart line
    ///
    /// Lines whose sale was rejected stay in the cart and the checkout
    /// fails, even when other lines were recorded.
    pub async fn cart_checkout(&mut self) -> AppResult<Vec<Sale>> {
        self.require(Route::Cart).await?;

        let pending = self.state.cart.clone();
        let payloads = self.state.cart.checkout();
        let total = payloads.len();
        let mut recorded = Vec::with_capacity(total);
        let mut first_error = None;
        for (payload, line) in payloads.into_iter().zip(pending.lines) {
            match self.sales.create(payload).await {
                Ok(sale) => recorded.push(sale),
                Err(e) => {
                    self.state.cart.lines.push(line);
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            None => Ok(recorded),
            Some(e) if recorded.is_empty() => Err(e),
            Some(e) => {
                let failed = total - recorded.len();
                tracing::warn!(failed, recorded = recorded.len(), "checkout partially failed");
                Err(AppError::with_message(
                    e.kind,
                    format!("{failed} of {total} cart lines were not recorded: {}", e.message),
                )
                .with_detail("recorded", recorded.len()))
            }
        }
    }

    fn report(&self, err: AppError) -> AppError {
        self.notices.error(&err);
        err
    }
}
