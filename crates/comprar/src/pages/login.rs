//! Login page: the entry gate of the flow.

use crate::command::Predicate;
use crate::config::UserRole;
use crate::locator::ElementQuery;
use crate::result::ComprarResult;
use crate::session::Session;

/// The login page at the site root.
#[derive(Debug)]
pub struct LoginPage<'a> {
    session: &'a mut Session,
}

impl<'a> LoginPage<'a> {
    const PATH: &'static str = "/";

    /// Wrap a session positioned anywhere; call [`LoginPage::navigate`]
    /// to get to the page.
    pub fn new(session: &'a mut Session) -> Self {
        Self { session }
    }

    fn username_input() -> ElementQuery {
        ElementQuery::test_id("username")
    }

    fn password_input() -> ElementQuery {
        ElementQuery::test_id("password")
    }

    fn login_button() -> ElementQuery {
        ElementQuery::test_id("login-button")
    }

    fn error_banner() -> ElementQuery {
        ElementQuery::test_id("error")
    }

    /// Navigate to the login page.
    pub fn navigate(&mut self) -> ComprarResult<()> {
        self.session.visit(Self::PATH)
    }

    /// Wait for the logo and the login form to be interactable.
    pub fn verify_loaded(&mut self) -> ComprarResult<()> {
        self.session
            .assert(ElementQuery::css(".login_logo"), Predicate::Visible)?;
        self.session.assert(Self::username_input(), Predicate::Visible)?;
        self.session.assert(Self::password_input(), Predicate::Visible)?;
        self.session.assert(Self::login_button(), Predicate::Visible)
    }

    /// Type the username.
    pub fn enter_username(&mut self, username: &str) -> ComprarResult<()> {
        self.session.type_text(Self::username_input(), username)
    }

    /// Type the password.
    pub fn enter_password(&mut self, password: &str) -> ComprarResult<()> {
        self.session.type_text(Self::password_input(), password)
    }

    /// Click the login button.
    pub fn submit(&mut self) -> ComprarResult<()> {
        self.session.click(Self::login_button())
    }

    /// Fill both fields and submit. Makes no claim about the outcome;
    /// pair with [`LoginPage::verify_successful_login`] or
    /// [`LoginPage::verify_error_contains`].
    pub fn login(&mut self, username: &str, password: &str) -> ComprarResult<()> {
        self.enter_username(username)?;
        self.enter_password(password)?;
        self.submit()
    }

    /// Navigate and log in as a named fixture identity.
    pub fn login_as(&mut self, role: UserRole) -> ComprarResult<()> {
        let username = self.session.config().username_for(role).to_string();
        let password = self.session.config().password.0.clone();
        self.navigate()?;
        self.verify_loaded()?;
        self.login(&username, &password)
    }

    /// Log in as the standard user and verify it landed on the inventory.
    pub fn login_as_standard(&mut self) -> ComprarResult<()> {
        self.login_as(UserRole::Standard)?;
        self.verify_successful_login()
    }

    /// The current error banner text.
    pub fn error_message(&mut self) -> ComprarResult<String> {
        self.session.read_text(Self::error_banner())
    }

    /// Wait for the error banner to contain `text`.
    pub fn verify_error_contains(&mut self, text: &str) -> ComprarResult<()> {
        self.session
            .assert(Self::error_banner(), Predicate::TextContains(text.to_string()))
    }

    /// Dismiss the error banner and verify it is gone.
    pub fn close_error(&mut self) -> ComprarResult<()> {
        self.session.click(ElementQuery::test_id("error-button"))?;
        self.session.assert(Self::error_banner(), Predicate::Absent)
    }

    /// The login succeeded: we are on the inventory page.
    pub fn verify_successful_login(&mut self) -> ComprarResult<()> {
        self.session
            .assert_page(Predicate::UrlContains("/inventory.html".to_string()))
    }

    /// The login was rejected: still on the login page.
    pub fn verify_still_on_login(&mut self) -> ComprarResult<()> {
        let url = self.session.config().url_for(Self::PATH);
        self.session.assert_page(Predicate::UrlEquals(url))
    }

    /// The credentials panel lists a username we expect to work.
    pub fn verify_accepted_usernames(&mut self) -> ComprarResult<()> {
        let standard = self.session.config().username_for(UserRole::Standard).to_string();
        self.session.assert(
            ElementQuery::test_id("login-credentials"),
            Predicate::TextContains(standard),
        )
    }

    /// The password hint panel shows the shared fixture password.
    pub fn verify_password_hint(&mut self) -> ComprarResult<()> {
        let password = self.session.config().password.0.clone();
        self.session.assert(
            ElementQuery::test_id("login-password"),
            Predicate::TextContains(password),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::mock::FakeStorefront;

    fn session() -> Session {
        let mut config = HarnessConfig::default();
        config.timeouts.default_ms = 200;
        config.timeouts.page_load_ms = 200;
        config.timeouts.poll_interval_ms = 5;
        Session::new(Box::new(FakeStorefront::new()), config)
    }

    #[test]
    fn test_standard_user_reaches_inventory() {
        let mut s = session();
        LoginPage::new(&mut s).login_as_standard().unwrap();
    }

    #[test]
    fn test_locked_out_user_is_refused_with_message() {
        let mut s = session();
        let mut page = LoginPage::new(&mut s);
        page.login_as(UserRole::LockedOut).unwrap();
        page.verify_error_contains("Epic sadface: Sorry, this user has been locked out.")
            .unwrap();
        page.verify_still_on_login().unwrap();
    }

    #[test]
    fn test_error_banner_can_be_dismissed() {
        let mut s = session();
        let mut page = LoginPage::new(&mut s);
        page.login_as(UserRole::LockedOut).unwrap();
        page.verify_error_contains("locked out").unwrap();
        page.close_error().unwrap();
    }

    #[test]
    fn test_wrong_password_keeps_us_on_login() {
        let mut s = session();
        let mut page = LoginPage::new(&mut s);
        page.navigate().unwrap();
        page.login("standard_user", "not_the_password").unwrap();
        page.verify_error_contains("do not match any user").unwrap();
        page.verify_still_on_login().unwrap();
    }

    #[test]
    fn test_credentials_panels_show_fixture_data() {
        let mut s = session();
        let mut page = LoginPage::new(&mut s);
        page.navigate().unwrap();
        page.verify_accepted_usernames().unwrap();
        page.verify_password_hint().unwrap();
    }
}
