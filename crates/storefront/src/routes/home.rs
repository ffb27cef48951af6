//! Home and department pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::Path;
use tracing::instrument;

use super::PageHeader;
use crate::content::{self, DEPARTMENTS, Department};
use crate::error::AppError;
use crate::filters;
use crate::lifecycle::ViewScope;
use crate::middleware::Client;

/// A category link.
#[derive(Clone)]
pub struct CategoryLink {
    pub href: String,
    pub label: String,
}

/// A department with its category links.
#[derive(Clone)]
pub struct DepartmentView {
    pub slug: &'static str,
    pub title: &'static str,
    pub categories: Vec<CategoryLink>,
}

impl From<&Department> for DepartmentView {
    fn from(department: &Department) -> Self {
        Self {
            slug: department.slug,
            title: department.title,
            categories: department
                .categories
                .iter()
                .map(|category| CategoryLink {
                    href: format!("/category/{category}"),
                    label: content::format_category(category),
                })
                .collect(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub header: PageHeader,
    pub departments: Vec<DepartmentView>,
}

/// Department page template.
#[derive(Template, WebTemplate)]
#[template(path = "department.html")]
pub struct DepartmentTemplate {
    pub header: PageHeader,
    pub department: DepartmentView,
}

/// Display the home page: the "Shop by Department" menu.
#[instrument(skip(client))]
pub async fn home(Client(client): Client) -> HomeTemplate {
    let _view = ViewScope::mount("home", &client.notices);
    HomeTemplate {
        header: client.store.select(PageHeader::from_state),
        departments: DEPARTMENTS.iter().map(DepartmentView::from).collect(),
    }
}

/// Display one department and its categories.
#[instrument(skip(client))]
pub async fn department(
    Client(client): Client,
    Path(slug): Path<String>,
) -> Result<DepartmentTemplate, AppError> {
    let department = content::department(&slug)
        .ok_or_else(|| AppError::NotFound(format!("department {slug}")))?;
    let _view = ViewScope::mount("department", &client.notices);

    Ok(DepartmentTemplate {
        header: client.store.select(PageHeader::from_state),
        department: department.into(),
    })
}
