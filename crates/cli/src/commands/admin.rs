//! Admin panel helpers.

use sillage_storefront::services::auth::{self, AuthError};

/// Hash `password` and print the PHC string.
///
/// The output goes into `ADMIN_PASSWORD_HASH`.
///
/// # Errors
///
/// Returns an error if the password is too short or hashing fails.
pub fn hash_password(password: &str) -> Result<(), AuthError> {
    auth::validate_password(password)?;
    let hash = auth::hash_password(password)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{hash}");
    }
    Ok(())
}
