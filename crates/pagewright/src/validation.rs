//! Form validation helpers and random test data.

use crate::driver::Driver;
use crate::locator::Locator;
use crate::page_object::PageSession;
use crate::result::{PagewrightError, PagewrightResult};
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::debug;

/// Passwords must be longer than this many characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Whether `password` has at least one digit, one uppercase and one lowercase letter
#[must_use]
pub fn check_password(password: &str) -> bool {
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);
    has_digit && has_upper && has_lower
}

/// `len` random characters from `[A-Za-z0-9]`
#[must_use]
pub fn random_string(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Position of the first entry equal to `item`
#[must_use]
pub fn find_index_of_string<S: AsRef<str>>(items: &[S], item: &str) -> Option<usize> {
    let index = items.iter().position(|candidate| candidate.as_ref() == item);
    debug!(item, ?index, "searched list");
    index
}

impl<D: Driver> PageSession<D> {
    /// Type `password` into the field and report whether it is strong enough
    pub fn password_validation(&self, locator: &Locator, password: &str) -> PagewrightResult<bool> {
        let field = self.wait_for_element(locator)?;
        self.driver().send_keys(&field, password)?;
        let valid = password.chars().count() > MIN_PASSWORD_LENGTH && check_password(password);
        if !valid {
            debug!(locator = %locator, "password not valid");
        }
        Ok(valid)
    }

    /// Check that `counter` counts down as characters are typed into `input`
    /// and that `input` truncates at `max_length`.
    pub fn check_max_length_counter(
        &self,
        input: &Locator,
        counter: &Locator,
        max_length: usize,
    ) -> PagewrightResult<()> {
        self.enter_text(input, "")?;
        self.expect_counter(counter, max_length)?;

        let field = self.driver().find_one(input)?;
        for typed in 1..=max_length {
            self.driver().send_keys(&field, "a")?;
            self.expect_counter(counter, max_length - typed)?;
        }

        let overflow = random_string(max_length + 1);
        self.enter_text(input, &overflow)?;
        let value = self.get_text(input)?;
        let expected: String = overflow.chars().take(max_length).collect();
        if value != expected {
            return Err(PagewrightError::assertion(format!(
                "{input} accepted '{value}', expected the first {max_length} characters of '{overflow}'"
            )));
        }
        Ok(())
    }

    fn expect_counter(&self, counter: &Locator, expected: usize) -> PagewrightResult<()> {
        let shown = self.get_text(counter)?;
        let remaining: usize = shown.trim().parse().map_err(|_| {
            PagewrightError::assertion(format!("{counter} shows '{shown}', not a number"))
        })?;
        if remaining != expected {
            return Err(PagewrightError::assertion(format!(
                "{counter} shows {remaining}, expected {expected}"
            )));
        }
        Ok(())
    }
}
