//! Command handlers
//!
//! Each resource command is written once, generic over the resource, and
//! dispatched from [`ResourceKind`].

use shared::models::{
    Admin, Branch, Brand, Category, Debt, PermissionDef, Product, Report, Resource, Sale,
};
use shared::{AppError, AppResult, CrudAction, Listable, Pagination};
use tally_console::view::csv;
use tally_console::{Console, Filter, ListQuery, ResourceController, SortSpec, console::route_for};

use crate::{CartCommand, ListArgs, ResourceKind};

/// Run `$body` with `$ctl` bound to the controller for `$kind` and `R` to
/// its resource type.
macro_rules! with_resource {
    ($console:expr, $kind:expr, |$ctl:ident: $r:ident| $body:expr) => {
        match $kind {
            ResourceKind::Products => {
                type $r = Product;
                let $ctl = $console.products.clone();
                $body
            }
            ResourceKind::Categories => {
                type $r = Category;
                let $ctl = $console.categories.clone();
                $body
            }
            ResourceKind::Brands => {
                type $r = Brand;
                let $ctl = $console.brands.clone();
                $body
            }
            ResourceKind::Branches => {
                type $r = Branch;
                let $ctl = $console.branches.clone();
                $body
            }
            ResourceKind::Admins => {
                type $r = Admin;
                let $ctl = $console.admins.clone();
                $body
            }
            ResourceKind::Permissions => {
                type $r = PermissionDef;
                let $ctl = $console.permissions.clone();
                $body
            }
            ResourceKind::Sales => {
                type $r = Sale;
                let $ctl = $console.sales.clone();
                $body
            }
            ResourceKind::Debts => {
                type $r = Debt;
                let $ctl = $console.debts.clone();
                $body
            }
            ResourceKind::Reports => {
                type $r = Report;
                let $ctl = $console.reports.clone();
                $body
            }
        }
    };
}

pub fn whoami(console: &Console) -> AppResult<()> {
    let session = console.session();
    match (session.is_authenticated(), session.user()) {
        (true, Some(user)) => {
            let role = session.role().map(|r| r.name()).unwrap_or("-");
            println!("{} <{}> role={role}", user.display_name(), user.username);
            let permissions: Vec<String> = session
                .state()
                .permissions
                .iter()
                .map(ToString::to_string)
                .collect();
            if !permissions.is_empty() {
                println!("permissions: {}", permissions.join(", "));
            }
            Ok(())
        }
        _ => {
            println!("not logged in");
            Ok(())
        }
    }
}

impl ListArgs {
    fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.filters.is_empty()
            && self.sort.is_none()
            && self.page.is_none()
            && self.per_page.is_none()
    }

    /// Query from the flags, on top of `base`
    fn to_query(&self, base: ListQuery) -> AppResult<ListQuery> {
        let mut query = base;
        if self.is_empty() {
            return Ok(query);
        }
        query.search = self.search.clone();
        query.filters = self
            .filters
            .iter()
            .map(|f| f.parse::<Filter>())
            .collect::<AppResult<_>>()?;
        query.sort = self.sort.as_deref().map(str::parse::<SortSpec>).transpose()?;
        query.page = self.page.unwrap_or(1);
        if let Some(per_page) = self.per_page {
            query.per_page = per_page.max(1);
        }
        Ok(query)
    }
}

/// Plain-text table of the entity's columns
fn render_table<R: Listable>(rows: &[R]) -> String {
    let columns = R::columns();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.field(c.key).map(|v| v.to_string()).unwrap_or_default())
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, &w)| format!("{v:<w$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = line(columns.iter().map(|c| c.header).collect());
    out.push('\n');
    for row in &cells {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}

fn print_footer(p: &Pagination) {
    println!("page {}/{} ({} rows)", p.page, p.total_pages.max(1), p.total);
    if p.has_next() {
        println!("next: --page {}", p.page + 1);
    }
}

async fn list_resource<R: Resource>(
    console: &mut Console,
    ctl: ResourceController<R>,
    args: &ListArgs,
) -> AppResult<()> {
    console.require(route_for(R::PATH)).await?;
    ctl.refresh().await?;

    let query = args.to_query(console.query_for(R::PATH))?;

    if let Some(path) = &args.csv {
        let content = ctl.export_csv(&query).await;
        std::fs::write(path, content)
            .map_err(|e| AppError::storage(format!("Failed to write {}: {e}", path.display())))?;
        console
            .notices()
            .success(format!("Exported to {}", path.display()));
    } else {
        let view = ctl.view(&query).await;
        print!("{}", render_table(&view.items));
        print_footer(&view.pagination);
    }

    console.remember_query(R::PATH, query);
    Ok(())
}

async fn list_products_with_names(console: &mut Console, args: &ListArgs) -> AppResult<()> {
    console.require(route_for(Product::PATH)).await?;
    console.products.refresh().await?;
    // Names are cosmetic; a failed lookup falls back to identifiers
    if let Err(e) = console.categories.refresh().await {
        tracing::debug!(error = %e, "category names unavailable");
    }
    if let Err(e) = console.brands.refresh().await {
        tracing::debug!(error = %e, "brand names unavailable");
    }

    let query = args.to_query(console.query_for(Product::PATH))?;
    let products = console.products_with_names().await;

    if let Some(path) = &args.csv {
        let rows = csv::write_file(path, &query, &products)?;
        console
            .notices()
            .success(format!("Exported {rows} rows to {}", path.display()));
    } else {
        let view = query.apply(&products);
        print!("{}", render_table(&view.items));
        print_footer(&view.pagination);
    }

    console.remember_query(Product::PATH, query);
    Ok(())
}

pub async fn list(console: &mut Console, kind: ResourceKind, args: &ListArgs) -> AppResult<()> {
    if kind == ResourceKind::Products && args.names {
        return list_products_with_names(console, args).await;
    }
    with_resource!(console, kind, |ctl: R| list_resource::<R>(console, ctl, args).await)
}

async fn show_resource<R: Resource>(
    console: &mut Console,
    ctl: ResourceController<R>,
    id: &str,
) -> AppResult<()> {
    console.require(route_for(R::PATH)).await?;
    ctl.refresh().await?;
    let record = ctl
        .get(id)
        .await
        .ok_or_else(|| AppError::missing(R::NAME, id))
        .inspect_err(|e| console.notices().error(e))?;
    let json = serde_json::to_string_pretty(&record)
        .map_err(|e| AppError::invalid_response(e.to_string()))?;
    println!("{json}");
    Ok(())
}

pub async fn show(console: &mut Console, kind: ResourceKind, id: &str) -> AppResult<()> {
    with_resource!(console, kind, |ctl: R| show_resource::<R>(console, ctl, id).await)
}

fn parse_payload<T: serde::de::DeserializeOwned>(json: &str) -> AppResult<T> {
    serde_json::from_str(json).map_err(|e| AppError::validation(format!("Invalid JSON payload: {e}")))
}

async fn mutate<R: Resource>(
    console: &mut Console,
    ctl: ResourceController<R>,
    action: CrudAction<R::Create, R::Update>,
) -> AppResult<()> {
    console.require(route_for(R::PATH)).await?;
    if action.target().is_some() {
        // Updates and deletes patch the loaded collection
        ctl.refresh().await?;
    }
    if let Some(record) = ctl.dispatch(action).await? {
        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| AppError::invalid_response(e.to_string()))?;
        println!("{json}");
    }
    Ok(())
}

fn report(console: &Console, err: AppError) -> AppError {
    console.notices().error(&err);
    err
}

pub async fn create(console: &mut Console, kind: ResourceKind, json: &str) -> AppResult<()> {
    with_resource!(console, kind, |ctl: R| {
        let payload = parse_payload::<<R as Resource>::Create>(json).map_err(|e| report(console, e))?;
        mutate::<R>(console, ctl, CrudAction::Create(payload)).await
    })
}

pub async fn update(console: &mut Console, kind: ResourceKind, id: &str, json: &str) -> AppResult<()> {
    with_resource!(console, kind, |ctl: R| {
        let data = parse_payload::<<R as Resource>::Update>(json).map_err(|e| report(console, e))?;
        mutate::<R>(
            console,
            ctl,
            CrudAction::Update {
                id: id.to_string(),
                data,
            },
        )
        .await
    })
}

pub async fn delete(console: &mut Console, kind: ResourceKind, id: &str) -> AppResult<()> {
    with_resource!(console, kind, |ctl: R| {
        mutate::<R>(console, ctl, CrudAction::Delete { id: id.to_string() }).await
    })
}

pub async fn cart(console: &mut Console, command: CartCommand) -> AppResult<()> {
    match command {
        CartCommand::Add { product, quantity } => console.cart_add(&product, quantity).await?,
        CartCommand::Remove { product } => {
            if console.state_mut().cart.remove(&product).is_none() {
                return Err(report(console, AppError::missing("cart line", &product)));
            }
        }
        CartCommand::Show => {}
        CartCommand::Checkout => {
            let sales = console.cart_checkout().await?;
            println!("{} sales recorded", sales.len());
        }
    }

    let cart = &console.state().cart;
    for line in &cart.lines {
        println!(
            "{:<24} {:>6} x {:>10} = {:>10}",
            line.name,
            line.quantity,
            line.unit_price.normalize(),
            line.amount().normalize()
        );
    }
    println!("total {}", cart.total().normalize());
    Ok(())
}
