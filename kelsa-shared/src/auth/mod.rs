/// Authentication utilities
///
/// - [`password`]: Argon2id password hashing
/// - [`jwt`]: access and refresh token issuance and validation
/// - [`middleware`]: Axum bearer-token layer and the `AuthContext` extractor
///
/// # Example
///
/// ```
/// use kelsa_shared::auth::jwt::{create_token, validate_token, Claims, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "an-example-secret-that-is-32-bytes!";
/// let token = create_token(&Claims::new(Uuid::new_v4(), TokenType::Refresh), secret)?;
/// assert_eq!(validate_token(&token, secret)?.token_type, TokenType::Refresh);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
