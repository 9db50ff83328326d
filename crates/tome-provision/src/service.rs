//! Account provisioning — the orchestration every OAuth callback runs.

use tracing::{info, warn};
use uuid::Uuid;

use tome_core::TomeError;
use tome_core::models::authentication_provider::{
    AuthenticationProvider, CreateAuthenticationProvider,
};
use tome_core::models::team::Team;
use tome_core::models::user::{CreateUser, UpdateUser, User};
use tome_core::repository::{
    AuthenticationProviderRepository, TeamDomainRepository, TeamRepository, UserRepository,
};

use crate::config::{DeploymentMode, ProvisionConfig};
use crate::error::ProvisionError;
use crate::resolver::{ResolveTeamInput, TeamResolver};
use crate::subdomain::normalize_subdomain;

/// Team attributes carried by the sign-in.
#[derive(Debug, Clone)]
pub struct TeamParams {
    /// Explicit existing-team id, when the request context supplies one.
    pub id: Option<Uuid>,
    pub name: String,
    /// Desired subdomain, raw; normalized before resolution.
    pub subdomain: String,
    pub avatar_url: Option<String>,
    /// Email/login domain of the sign-in, when the provider exposes one.
    pub domain: Option<String>,
}

/// User attributes carried by the sign-in.
#[derive(Debug, Clone)]
pub struct UserParams {
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    /// Identifier of the user at the external identity provider.
    pub service_id: String,
}

/// The external identity-provider account authenticating this sign-in.
#[derive(Debug, Clone)]
pub struct AuthenticationProviderParams {
    pub name: String,
    pub provider_id: String,
}

#[derive(Debug, Clone)]
pub struct ProvisionInput {
    pub team: TeamParams,
    pub user: UserParams,
    pub authentication_provider: AuthenticationProviderParams,
}

/// The aggregate a successful provisioning call hands to the session
/// layer. Never partially populated: any failure along the way surfaces
/// as a single error instead.
#[derive(Debug)]
pub struct ProvisionOutcome {
    pub team: Team,
    pub user: User,
    pub authentication_provider: AuthenticationProvider,
    /// Downstream decides whether to run first-time-setup side effects.
    pub is_new_team: bool,
    pub is_new_user: bool,
}

/// Account provisioner.
///
/// Generic over repository implementations so that provisioning has no
/// dependency on the database crate. Every OAuth callback — Slack,
/// Google, or any later provider — runs through the same `provision`
/// call.
pub struct Provisioner<
    T: TeamRepository,
    A: AuthenticationProviderRepository,
    U: UserRepository,
    D: TeamDomainRepository,
> {
    teams: T,
    providers: A,
    users: U,
    domains: D,
    config: ProvisionConfig,
}

impl<T, A, U, D> Provisioner<T, A, U, D>
where
    T: TeamRepository,
    A: AuthenticationProviderRepository,
    U: UserRepository,
    D: TeamDomainRepository,
{
    pub fn new(teams: T, providers: A, users: U, domains: D, config: ProvisionConfig) -> Self {
        Self {
            teams,
            providers,
            users,
            domains,
            config,
        }
    }

    /// Resolve the team, attach the authentication provider, and find or
    /// create the user.
    ///
    /// Idempotent: repeating a call with an identical input returns the
    /// same team and user with `is_new_team == false`. When a failure
    /// strikes after a brand-new team was created, that team is removed
    /// again so an aborted sign-up leaves nothing behind.
    pub async fn provision(
        &self,
        input: ProvisionInput,
    ) -> Result<ProvisionOutcome, ProvisionError> {
        // Deployment mode is read once per call.
        let mode = self.config.deployment_mode;

        let resolve_input = self.validate(&input, mode)?;

        let resolver = TeamResolver::new(&self.teams, &self.providers, &self.domains);
        let resolved = resolver.resolve(mode, &resolve_input).await?;

        match self.attach_identity(&resolved.team, &input).await {
            Ok((authentication_provider, user, is_new_user)) => {
                info!(
                    team_id = %resolved.team.id,
                    user_id = %user.id,
                    is_new_team = resolved.is_new,
                    is_new_user,
                    "provisioned account"
                );
                Ok(ProvisionOutcome {
                    team: resolved.team,
                    user,
                    authentication_provider,
                    is_new_team: resolved.is_new,
                    is_new_user,
                })
            }
            Err(err) => {
                if resolved.is_new {
                    // Remove the team created moments ago so the failed
                    // attempt leaves no half-provisioned tenant.
                    if let Err(cleanup) = self.teams.delete(resolved.team.id).await {
                        warn!(
                            team_id = %resolved.team.id,
                            error = %cleanup,
                            "failed to clean up team after provisioning error"
                        );
                    }
                }
                Err(err)
            }
        }
    }

    /// Check required fields and fold the team params into a resolver
    /// input with a normalized subdomain.
    fn validate(
        &self,
        input: &ProvisionInput,
        mode: DeploymentMode,
    ) -> Result<ResolveTeamInput, ProvisionError> {
        let missing = |field: &str| ProvisionError::Validation(format!("{field} is required"));

        if input.team.name.trim().is_empty() {
            return Err(missing("team.name"));
        }
        if input.authentication_provider.name.trim().is_empty() {
            return Err(missing("authentication_provider.name"));
        }
        if input.authentication_provider.provider_id.trim().is_empty() {
            return Err(missing("authentication_provider.provider_id"));
        }
        if input.user.service_id.trim().is_empty() {
            return Err(missing("user.service_id"));
        }
        if input.user.email.trim().is_empty() {
            return Err(missing("user.email"));
        }

        let subdomain = normalize_subdomain(&input.team.subdomain);
        // Shared hosting routes teams by subdomain, so a sign-up that
        // may create one must carry a usable candidate.
        if subdomain.is_empty()
            && mode == DeploymentMode::MultiTenant
            && input.team.id.is_none()
        {
            return Err(missing("team.subdomain"));
        }

        Ok(ResolveTeamInput {
            team_id: input.team.id,
            name: input.team.name.clone(),
            subdomain,
            avatar_url: input.team.avatar_url.clone(),
            domain: input.team.domain.clone(),
            provider_name: input.authentication_provider.name.clone(),
            provider_id: input.authentication_provider.provider_id.clone(),
        })
    }

    /// Steps 2 and 3: find-or-create the provider attachment, then the
    /// user. Both are keyed on unique indexes, so a create that loses a
    /// race to an identical concurrent attempt falls back to the lookup
    /// instead of failing the sign-in.
    async fn attach_identity(
        &self,
        team: &Team,
        input: &ProvisionInput,
    ) -> Result<(AuthenticationProvider, User, bool), ProvisionError> {
        let provider_params = &input.authentication_provider;

        let authentication_provider = match self
            .providers
            .find_by_team_and_key(team.id, &provider_params.name, &provider_params.provider_id)
            .await?
        {
            Some(existing) => existing,
            None => {
                let create = CreateAuthenticationProvider {
                    team_id: team.id,
                    name: provider_params.name.clone(),
                    provider_id: provider_params.provider_id.clone(),
                };
                match self.providers.create(create).await {
                    Ok(created) => created,
                    Err(TomeError::Conflict { .. }) => self
                        .providers
                        .find_by_team_and_key(
                            team.id,
                            &provider_params.name,
                            &provider_params.provider_id,
                        )
                        .await?
                        .ok_or_else(|| {
                            TomeError::Internal(
                                "provider vanished after create conflict".into(),
                            )
                        })?,
                    Err(err) => return Err(err.into()),
                }
            }
        };

        let (user, is_new_user) = match self
            .users
            .find_by_service_id(team.id, &input.user.service_id)
            .await?
        {
            Some(existing) => {
                let user = self.refresh_user(&existing, &input.user).await?;
                (user, false)
            }
            None => {
                let create = CreateUser {
                    team_id: team.id,
                    name: input.user.name.clone(),
                    email: input.user.email.clone(),
                    avatar_url: input.user.avatar_url.clone(),
                    service_id: input.user.service_id.clone(),
                };
                match self.users.create(create).await {
                    Ok(created) => (created, true),
                    Err(TomeError::Conflict { .. }) => {
                        let existing = self
                            .users
                            .find_by_service_id(team.id, &input.user.service_id)
                            .await?
                            .ok_or_else(|| {
                                TomeError::Internal(
                                    "user vanished after create conflict".into(),
                                )
                            })?;
                        let user = self.refresh_user(&existing, &input.user).await?;
                        (user, false)
                    }
                    Err(err) => return Err(err.into()),
                }
            }
        };

        Ok((authentication_provider, user, is_new_user))
    }

    /// Repeat logins refresh the display fields from the provider
    /// profile; identity fields stay untouched.
    async fn refresh_user(&self, existing: &User, params: &UserParams) -> Result<User, TomeError> {
        let name = (existing.name != params.name).then(|| params.name.clone());
        let avatar_url = (existing.avatar_url != params.avatar_url)
            .then(|| params.avatar_url.clone())
            .flatten();

        if name.is_none() && avatar_url.is_none() {
            return Ok(existing.clone());
        }

        self.users
            .update(existing.id, UpdateUser { name, avatar_url })
            .await
    }
}
