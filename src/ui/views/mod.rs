mod categories;
mod dashboard;
mod login;
mod products;
mod reviews;
mod subcategories;
mod users;

pub use categories::CategoryListView;
pub use dashboard::DashboardView;
pub use login::LoginView;
pub use products::ProductListView;
pub use reviews::ReviewListView;
pub use subcategories::SubcategoryListView;
pub use users::UserListView;
