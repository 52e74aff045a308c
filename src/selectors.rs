//! Every portal-specific locator in one place, so a selector change on the
//! site is a one-line edit.

use crate::browser::By;

pub const PORTAL_URL: &str = "https://www.naukri.com/";

pub const LOGIN_LINK: By<'static> = By::LinkText("Login");
pub const USERNAME_FIELD: By<'static> = By::Id("usernameField");
pub const PASSWORD_FIELD: By<'static> = By::Id("passwordField");
pub const SEARCH_BOX: By<'static> = By::Id("qsb-keyword-sugg");

pub const JOB_CARD: By<'static> = By::Css("article.jobTuple");
pub const TITLE_LINK: By<'static> = By::Css("a.title");
pub const COMPANY_LINK: By<'static> = By::Css("a.compName");
pub const LOCATION_ITEM: By<'static> = By::Css("li.location");
pub const APPLY_BUTTON: By<'static> = By::Css("button.btn-apply");
