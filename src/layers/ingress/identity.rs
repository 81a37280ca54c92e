// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identity pool, hosted authentication domain and the application client
//! the listener authenticates through.

use serde::{Deserialize, Serialize};

use crate::domain::{Hostname, ResourceKind};
use crate::graph::{AttrRef, GraphError, ResourceGraph, ResourceId};

/// Path the load balancer receives the identity provider's response on
pub const CALLBACK_PATH: &str = "/oauth2/idpresponse";

/// Path users are sent to after signing out
pub const LOGOUT_PATH: &str = "/logout";

/// `https://{fqdn}/oauth2/idpresponse`
pub fn callback_url(fqdn: &Hostname) -> String {
    format!("https://{fqdn}{CALLBACK_PATH}")
}

/// `https://{fqdn}/logout`
pub fn logout_url(fqdn: &Hostname) -> String {
    format!("https://{fqdn}{LOGOUT_PATH}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignInAliases {
    pub email: bool,
    pub username: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoolProps {
    pub name: String,
    /// Users are enrolled by an administrator only
    pub self_sign_up_enabled: bool,
    pub sign_in_aliases: SignInAliases,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoolDomainProps {
    pub user_pool: AttrRef,
    pub domain_prefix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuthFlow {
    AuthorizationCodeGrant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthFlows {
    pub user_srp: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthSettings {
    pub flows: Vec<OAuthFlow>,
    pub callback_urls: Vec<String>,
    pub logout_urls: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPoolClientProps {
    pub user_pool: AttrRef,
    pub generate_secret: bool,
    pub auth_flows: AuthFlows,
    pub oauth: OAuthSettings,
}

/// Declared identity resources
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_pool: ResourceId,
    pub domain: ResourceId,
    pub client: ResourceId,
    pub callback_url: String,
    pub logout_url: String,
}

/// Declare the user pool, its hosted domain and the load balancer's client
pub fn declare_identity(
    name: &str,
    fqdn: &Hostname,
    scope: &ResourceId,
    graph: &mut ResourceGraph,
) -> Result<Identity, GraphError> {
    let user_pool = graph.declare(
        scope.child("UserPool"),
        ResourceKind::UserPool,
        &UserPoolProps {
            name: format!("{name}-user-pool"),
            self_sign_up_enabled: false,
            sign_in_aliases: SignInAliases {
                email: true,
                username: false,
            },
        },
    )?;

    let domain = graph.declare(
        user_pool.child("Domain"),
        ResourceKind::UserPoolDomain,
        &UserPoolDomainProps {
            user_pool: AttrRef::id(&user_pool),
            domain_prefix: name.to_string(),
        },
    )?;

    let callback = callback_url(fqdn);
    let logout = logout_url(fqdn);

    let client = graph.declare(
        user_pool.child("Client"),
        ResourceKind::UserPoolClient,
        &UserPoolClientProps {
            user_pool: AttrRef::id(&user_pool),
            generate_secret: true,
            auth_flows: AuthFlows { user_srp: true },
            oauth: OAuthSettings {
                flows: vec![OAuthFlow::AuthorizationCodeGrant],
                callback_urls: vec![callback.clone()],
                logout_urls: vec![logout.clone()],
            },
        },
    )?;

    Ok(Identity {
        user_pool,
        domain,
        client,
        callback_url: callback,
        logout_url: logout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_urls() {
        let fqdn = Hostname::new("app.example.com").unwrap();
        assert_eq!(callback_url(&fqdn), "https://app.example.com/oauth2/idpresponse");
        assert_eq!(logout_url(&fqdn), "https://app.example.com/logout");
    }

    #[test]
    fn test_client_uses_code_grant_and_derived_urls() {
        let mut graph = ResourceGraph::new();
        let fqdn = Hostname::new("app.example.com").unwrap();
        let identity =
            declare_identity("image-reader", &fqdn, &ResourceId::new("AppIngress"), &mut graph)
                .unwrap();

        let pool: UserPoolProps = graph.get(&identity.user_pool).unwrap().properties_as().unwrap();
        assert!(!pool.self_sign_up_enabled);
        assert!(pool.sign_in_aliases.email);

        let client: UserPoolClientProps =
            graph.get(&identity.client).unwrap().properties_as().unwrap();
        assert_eq!(
            client.oauth,
            OAuthSettings {
                flows: vec![OAuthFlow::AuthorizationCodeGrant],
                callback_urls: vec!["https://app.example.com/oauth2/idpresponse".to_string()],
                logout_urls: vec!["https://app.example.com/logout".to_string()],
            }
        );
        assert!(client.generate_secret);

        let domain: UserPoolDomainProps =
            graph.get(&identity.domain).unwrap().properties_as().unwrap();
        assert_eq!(domain.domain_prefix, "image-reader");
    }
}
