//! Integration tests for team resolution and account provisioning,
//! running against in-memory SurrealDB with the real migrations and
//! repositories.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use tome_core::TomeError;
use tome_core::models::team::CreateTeam;
use tome_core::models::team_domain::CreateTeamDomain;
use tome_core::repository::{
    AuthenticationProviderRepository, TeamDomainRepository, TeamRepository, UserRepository,
};
use tome_db::repository::{
    SurrealAuthenticationProviderRepository, SurrealTeamDomainRepository, SurrealTeamRepository,
    SurrealUserRepository,
};
use tome_provision::{
    AuthenticationProviderParams, DeploymentMode, ProvisionConfig, ProvisionError, ProvisionInput,
    Provisioner, TeamParams, UserParams,
};

type Db = surrealdb::engine::local::Db;

type SurrealProvisioner = Provisioner<
    SurrealTeamRepository<Db>,
    SurrealAuthenticationProviderRepository<Db>,
    SurrealUserRepository<Db>,
    SurrealTeamDomainRepository<Db>,
>;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    tome_db::run_migrations(&db).await.unwrap();
    db
}

fn provisioner(db: &Surreal<Db>, mode: DeploymentMode) -> SurrealProvisioner {
    Provisioner::new(
        SurrealTeamRepository::new(db.clone()),
        SurrealAuthenticationProviderRepository::new(db.clone()),
        SurrealUserRepository::new(db.clone()),
        SurrealTeamDomainRepository::new(db.clone()),
        ProvisionConfig {
            deployment_mode: mode,
        },
    )
}

/// A sign-in from a Slack-like provider: `provider_id` identifies the
/// external workspace, `service_id` the external user.
fn sign_in(team_name: &str, subdomain: &str, provider_id: &str, service_id: &str) -> ProvisionInput {
    ProvisionInput {
        team: TeamParams {
            id: None,
            name: team_name.into(),
            subdomain: subdomain.into(),
            avatar_url: None,
            domain: None,
        },
        user: UserParams {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            avatar_url: None,
            service_id: service_id.into(),
        },
        authentication_provider: AuthenticationProviderParams {
            name: "slack".into(),
            provider_id: provider_id.into(),
        },
    }
}

// -----------------------------------------------------------------------
// Multi-tenant provisioning
// -----------------------------------------------------------------------

#[tokio::test]
async fn first_sign_in_creates_team_provider_and_user() {
    let db = setup().await;
    let p = provisioner(&db, DeploymentMode::MultiTenant);

    let outcome = p
        .provision(sign_in("Test team", "example", "T1", "U1"))
        .await
        .unwrap();

    assert!(outcome.is_new_team);
    assert!(outcome.is_new_user);
    assert_eq!(outcome.team.name, "Test team");
    assert_eq!(outcome.team.subdomain.as_deref(), Some("example"));
    assert_eq!(outcome.authentication_provider.team_id, outcome.team.id);
    assert!(outcome.authentication_provider.enabled);
    assert_eq!(outcome.user.team_id, outcome.team.id);
    assert_eq!(outcome.user.email, "ada@example.com");
}

#[tokio::test]
async fn provisioning_is_idempotent() {
    let db = setup().await;
    let p = provisioner(&db, DeploymentMode::MultiTenant);

    let first = p
        .provision(sign_in("Test team", "example", "T1", "U1"))
        .await
        .unwrap();
    let second = p
        .provision(sign_in("Test team", "example", "T1", "U1"))
        .await
        .unwrap();

    assert_eq!(first.team.id, second.team.id);
    assert_eq!(first.user.id, second.user.id);
    assert_eq!(
        first.authentication_provider.id,
        second.authentication_provider.id
    );
    assert!(!second.is_new_team);
    assert!(!second.is_new_user);

    let providers = SurrealAuthenticationProviderRepository::new(db);
    assert_eq!(providers.list_by_team(first.team.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn distinct_workspaces_with_same_subdomain_get_suffixes() {
    let db = setup().await;
    let p = provisioner(&db, DeploymentMode::MultiTenant);

    let first = p
        .provision(sign_in("Test team", "example", "T1", "U1"))
        .await
        .unwrap();
    let second = p
        .provision(sign_in("Other team", "example", "T2", "U2"))
        .await
        .unwrap();

    assert_ne!(first.team.id, second.team.id);
    assert_eq!(first.team.subdomain.as_deref(), Some("example"));
    assert_eq!(second.team.subdomain.as_deref(), Some("example1"));
}

#[tokio::test]
async fn contiguous_suffixes_probe_to_the_first_gap() {
    let db = setup().await;
    let teams = SurrealTeamRepository::new(db.clone());
    let p = provisioner(&db, DeploymentMode::MultiTenant);

    // "myteam" exists out-of-band.
    teams
        .create(CreateTeam {
            name: "My Team".into(),
            subdomain: Some("myteam".into()),
            avatar_url: None,
        })
        .await
        .unwrap();

    let first = p
        .provision(sign_in("My Team", "myteam", "T10", "U10"))
        .await
        .unwrap();
    assert_eq!(first.team.subdomain.as_deref(), Some("myteam1"));

    // With "myteam" and "myteam1" taken, the next sign-up lands on
    // "myteam2".
    let second = p
        .provision(sign_in("My Team", "myteam", "T11", "U11"))
        .await
        .unwrap();
    assert_eq!(second.team.subdomain.as_deref(), Some("myteam2"));
}

#[tokio::test]
async fn reserved_subdomains_are_treated_as_taken() {
    let db = setup().await;
    let p = provisioner(&db, DeploymentMode::MultiTenant);

    let outcome = p
        .provision(sign_in("Web team", "www", "T20", "U20"))
        .await
        .unwrap();
    assert_eq!(outcome.team.subdomain.as_deref(), Some("www1"));
}

#[tokio::test]
async fn subdomains_are_normalized_before_resolution() {
    let db = setup().await;
    let p = provisioner(&db, DeploymentMode::MultiTenant);

    let outcome = p
        .provision(sign_in("My Team", "My Team!", "T30", "U30"))
        .await
        .unwrap();
    assert_eq!(outcome.team.subdomain.as_deref(), Some("myteam"));
}

#[tokio::test]
async fn repeat_login_refreshes_display_fields() {
    let db = setup().await;
    let p = provisioner(&db, DeploymentMode::MultiTenant);

    let first = p
        .provision(sign_in("Test team", "example", "T1", "U1"))
        .await
        .unwrap();

    let mut repeat = sign_in("Test team", "example", "T1", "U1");
    repeat.user.name = "Ada Lovelace".into();
    repeat.user.avatar_url = Some("https://img.example.com/ada.png".into());

    let second = p.provision(repeat).await.unwrap();
    assert_eq!(second.user.id, first.user.id);
    assert_eq!(second.user.name, "Ada Lovelace");
    assert_eq!(
        second.user.avatar_url.as_deref(),
        Some("https://img.example.com/ada.png")
    );
}

#[tokio::test]
async fn teammates_join_the_same_team() {
    let db = setup().await;
    let p = provisioner(&db, DeploymentMode::MultiTenant);

    let first = p
        .provision(sign_in("Test team", "example", "T1", "U1"))
        .await
        .unwrap();
    let teammate = p
        .provision(sign_in("Test team", "example", "T1", "U2"))
        .await
        .unwrap();

    assert_eq!(teammate.team.id, first.team.id);
    assert!(!teammate.is_new_team);
    assert!(teammate.is_new_user);
    assert_ne!(teammate.user.id, first.user.id);
}

// -----------------------------------------------------------------------
// Domain allow-listing
// -----------------------------------------------------------------------

#[tokio::test]
async fn allow_listed_domain_joins_the_existing_team() {
    let db = setup().await;
    let domains = SurrealTeamDomainRepository::new(db.clone());
    let providers = SurrealAuthenticationProviderRepository::new(db.clone());
    let p = provisioner(&db, DeploymentMode::MultiTenant);

    let existing = p
        .provision(sign_in("Test team", "example", "T1", "U1"))
        .await
        .unwrap();
    domains
        .create(CreateTeamDomain {
            team_id: existing.team.id,
            name: "allowed-domain.com".into(),
        })
        .await
        .unwrap();

    // A different provider account signs in with a matching domain; the
    // requested name/subdomain are ignored in favor of the existing team.
    let mut input = sign_in("Fresh Name", "fresh", "workspace.example", "U40");
    input.authentication_provider.name = "google".into();
    input.team.domain = Some("allowed-domain.com".into());

    let outcome = p.provision(input).await.unwrap();
    assert_eq!(outcome.team.id, existing.team.id);
    assert!(!outcome.is_new_team);
    assert_eq!(
        providers.list_by_team(existing.team.id).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn unlisted_domain_is_rejected() {
    let db = setup().await;
    let teams = SurrealTeamRepository::new(db.clone());
    let users = SurrealUserRepository::new(db.clone());
    let domains = SurrealTeamDomainRepository::new(db.clone());
    let p = provisioner(&db, DeploymentMode::MultiTenant);

    let existing = p
        .provision(sign_in("Test team", "example", "T1", "U1"))
        .await
        .unwrap();
    domains
        .create(CreateTeamDomain {
            team_id: existing.team.id,
            name: "allowed-domain.com".into(),
        })
        .await
        .unwrap();

    // The provider key matches the existing team, but the sign-in
    // arrives from a domain outside the allow-list.
    let mut input = sign_in("Test team", "example", "T1", "U41");
    input.team.domain = Some("other-domain.com".into());

    let err = p.provision(input).await.unwrap_err();
    assert!(
        matches!(err, ProvisionError::DomainNotAllowed { ref domain } if domain == "other-domain.com"),
        "expected DomainNotAllowed, got {err:?}"
    );

    // Nothing was created by the failed attempt.
    assert_eq!(teams.count().await.unwrap(), 1);
    assert!(
        users
            .find_by_service_id(existing.team.id, "U41")
            .await
            .unwrap()
            .is_none()
    );
}

// -----------------------------------------------------------------------
// Single-tenant provisioning
// -----------------------------------------------------------------------

#[tokio::test]
async fn single_tenant_creates_exactly_one_team() {
    let db = setup().await;
    let p = provisioner(&db, DeploymentMode::SingleTenant);

    let first = p
        .provision(sign_in("Home Wiki", "ignored", "T1", "U1"))
        .await
        .unwrap();
    assert!(first.is_new_team);
    assert_eq!(first.team.subdomain, None);

    // A different workspace cannot create a second team here.
    let err = p
        .provision(sign_in("Another Wiki", "other", "T2", "U2"))
        .await
        .unwrap_err();
    assert!(
        matches!(err, ProvisionError::TeamCreationDenied),
        "expected TeamCreationDenied, got {err:?}"
    );

    // The original workspace resolves its team instead of creating one.
    let again = p
        .provision(sign_in("Home Wiki", "ignored", "T1", "U1"))
        .await
        .unwrap();
    assert_eq!(again.team.id, first.team.id);
    assert!(!again.is_new_team);
}

#[tokio::test]
async fn explicit_team_id_resolves_directly() {
    let db = setup().await;
    let p = provisioner(&db, DeploymentMode::SingleTenant);

    let first = p
        .provision(sign_in("Home Wiki", "ignored", "T1", "U1"))
        .await
        .unwrap();

    // A provider unseen so far still lands on the context-bound team.
    let mut input = sign_in("Home Wiki", "ignored", "T3", "U3");
    input.team.id = Some(first.team.id);
    input.authentication_provider.name = "google".into();

    let outcome = p.provision(input).await.unwrap();
    assert_eq!(outcome.team.id, first.team.id);
    assert!(!outcome.is_new_team);
    assert!(outcome.is_new_user);
}

#[tokio::test]
async fn unknown_explicit_team_id_fails() {
    let db = setup().await;
    let p = provisioner(&db, DeploymentMode::MultiTenant);

    let mut input = sign_in("Test team", "example", "T1", "U1");
    input.team.id = Some(uuid::Uuid::new_v4());

    let err = p.provision(input).await.unwrap_err();
    assert!(
        matches!(err, ProvisionError::Store(TomeError::NotFound { .. })),
        "expected NotFound, got {err:?}"
    );
}

// -----------------------------------------------------------------------
// Validation
// -----------------------------------------------------------------------

#[tokio::test]
async fn empty_provider_id_is_rejected() {
    let db = setup().await;
    let p = provisioner(&db, DeploymentMode::MultiTenant);

    let mut input = sign_in("Test team", "example", "T1", "U1");
    input.authentication_provider.provider_id = "".into();

    let err = p.provision(input).await.unwrap_err();
    assert!(matches!(err, ProvisionError::Validation(_)));
}

#[tokio::test]
async fn empty_team_name_is_rejected() {
    let db = setup().await;
    let p = provisioner(&db, DeploymentMode::MultiTenant);

    let mut input = sign_in("", "example", "T1", "U1");
    input.team.name = "   ".into();

    let err = p.provision(input).await.unwrap_err();
    assert!(matches!(err, ProvisionError::Validation(_)));
}
