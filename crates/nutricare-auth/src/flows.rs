use std::collections::HashMap;

use aws_sdk_cognitoidentityprovider::Client;
use aws_sdk_cognitoidentityprovider::types::{AttributeType, AuthFlowType};
use tracing::info;

use crate::error::AuthError;

/// Tokens returned by a successful login.
#[derive(Debug, Clone)]
pub struct AuthTokens {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: String,
}

/// Result of a signup attempt. Unconfirmed accounts need the emailed code
/// passed to [`confirm_signup`] before they can log in.
#[derive(Debug, Clone, Copy)]
pub struct SignupResult {
    pub user_confirmed: bool,
}

/// Username/password login. Challenge flows (MFA and the like) are not
/// offered to this user pool; a challenge response is treated as a failure.
pub async fn login(
    client: &Client,
    user_pool_client_id: &str,
    username: &str,
    password: &str,
) -> Result<AuthTokens, AuthError> {
    info!(username, "initiating auth");

    let mut auth_params = HashMap::new();
    auth_params.insert("USERNAME".to_string(), username.to_string());
    auth_params.insert("PASSWORD".to_string(), password.to_string());

    let resp = client
        .initiate_auth()
        .auth_flow(AuthFlowType::UserPasswordAuth)
        .client_id(user_pool_client_id)
        .set_auth_parameters(Some(auth_params))
        .send()
        .await
        .map_err(|e| AuthError::Cognito(e.into_service_error().to_string()))?;

    if let Some(result) = resp.authentication_result() {
        Ok(AuthTokens {
            access_token: result.access_token().unwrap_or_default().to_string(),
            id_token: result.id_token().unwrap_or_default().to_string(),
            refresh_token: result.refresh_token().unwrap_or_default().to_string(),
        })
    } else if let Some(challenge) = resp.challenge_name() {
        Err(AuthError::AuthFailed(format!(
            "unsupported auth challenge: {challenge}"
        )))
    } else {
        Err(AuthError::AuthFailed("unexpected response".to_string()))
    }
}

/// Create a new account. The email lands in the user's token claims and is
/// stamped onto every record they save.
pub async fn signup(
    client: &Client,
    user_pool_client_id: &str,
    username: &str,
    password: &str,
    email: &str,
) -> Result<SignupResult, AuthError> {
    info!(username, "signing up");

    let email_attribute = AttributeType::builder()
        .name("email")
        .value(email)
        .build()
        .map_err(|e| AuthError::SignupFailed(e.to_string()))?;

    let resp = client
        .sign_up()
        .client_id(user_pool_client_id)
        .username(username)
        .password(password)
        .user_attributes(email_attribute)
        .send()
        .await
        .map_err(|e| AuthError::SignupFailed(e.into_service_error().to_string()))?;

    Ok(SignupResult {
        user_confirmed: resp.user_confirmed(),
    })
}

/// Confirm a signup with the emailed verification code.
pub async fn confirm_signup(
    client: &Client,
    user_pool_client_id: &str,
    username: &str,
    code: &str,
) -> Result<(), AuthError> {
    client
        .confirm_sign_up()
        .client_id(user_pool_client_id)
        .username(username)
        .confirmation_code(code)
        .send()
        .await
        .map_err(|e| AuthError::SignupFailed(e.into_service_error().to_string()))?;

    Ok(())
}

/// Sign the user out of every device.
pub async fn logout(client: &Client, access_token: &str) -> Result<(), AuthError> {
    client
        .global_sign_out()
        .access_token(access_token)
        .send()
        .await
        .map_err(|e| AuthError::Cognito(e.into_service_error().to_string()))?;

    info!("signed out");
    Ok(())
}
