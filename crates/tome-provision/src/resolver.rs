//! Team resolution — decide which team a sign-in belongs to, creating
//! one when the deployment mode allows it.

use tracing::{debug, info};
use uuid::Uuid;

use tome_core::TomeError;
use tome_core::models::team::{CreateTeam, Team};
use tome_core::repository::{
    AuthenticationProviderRepository, TeamDomainRepository, TeamRepository,
};

use crate::config::DeploymentMode;
use crate::error::ProvisionError;
use crate::subdomain::resolve_available_subdomain;

/// Hints available to resolution, extracted from the OAuth profile and
/// the request context.
#[derive(Debug, Clone)]
pub struct ResolveTeamInput {
    /// Explicit existing-team id, when the request context is already
    /// bound to one.
    pub team_id: Option<Uuid>,
    pub name: String,
    /// Desired subdomain, already normalized.
    pub subdomain: String,
    pub avatar_url: Option<String>,
    /// Email/login domain of the sign-in, when the provider exposes one.
    pub domain: Option<String>,
    /// Provider kind of the authenticating account (e.g., `slack`).
    pub provider_name: String,
    /// External account id of the authenticating workspace/tenant.
    pub provider_id: String,
}

pub struct ResolvedTeam {
    pub team: Team,
    pub is_new: bool,
}

/// Resolves a sign-in to a team using, in order: the explicit team hint,
/// the login-domain allow-list, the provider key, and finally creation
/// (where the deployment mode permits it).
pub struct TeamResolver<
    'a,
    T: TeamRepository,
    A: AuthenticationProviderRepository,
    D: TeamDomainRepository,
> {
    teams: &'a T,
    providers: &'a A,
    domains: &'a D,
}

impl<'a, T, A, D> TeamResolver<'a, T, A, D>
where
    T: TeamRepository,
    A: AuthenticationProviderRepository,
    D: TeamDomainRepository,
{
    pub fn new(teams: &'a T, providers: &'a A, domains: &'a D) -> Self {
        Self {
            teams,
            providers,
            domains,
        }
    }

    pub async fn resolve(
        &self,
        mode: DeploymentMode,
        input: &ResolveTeamInput,
    ) -> Result<ResolvedTeam, ProvisionError> {
        match mode {
            DeploymentMode::SingleTenant => self.resolve_single_tenant(input).await,
            DeploymentMode::MultiTenant => self.resolve_multi_tenant(input).await,
        }
    }

    async fn resolve_single_tenant(
        &self,
        input: &ResolveTeamInput,
    ) -> Result<ResolvedTeam, ProvisionError> {
        if let Some(team) = self.resolve_existing(input).await? {
            return Ok(ResolvedTeam {
                team,
                is_new: false,
            });
        }

        if self.teams.first().await?.is_some() {
            return Err(ProvisionError::TeamCreationDenied);
        }

        // The one team this installation will ever hold. No subdomain:
        // a self-hosted instance is routed by its own hostname.
        let team = self
            .teams
            .create(CreateTeam {
                name: input.name.clone(),
                subdomain: None,
                avatar_url: input.avatar_url.clone(),
            })
            .await?;
        info!(team_id = %team.id, "created single-tenant team");

        Ok(ResolvedTeam { team, is_new: true })
    }

    async fn resolve_multi_tenant(
        &self,
        input: &ResolveTeamInput,
    ) -> Result<ResolvedTeam, ProvisionError> {
        if let Some(team) = self.resolve_existing(input).await? {
            return Ok(ResolvedTeam {
                team,
                is_new: false,
            });
        }

        let team = self.create_with_available_subdomain(input).await?;
        Ok(ResolvedTeam { team, is_new: true })
    }

    /// The shared resolution ladder for teams that already exist:
    /// explicit id, then allow-listed login domain, then provider key.
    /// Whichever rung matches, the team's domain allow-list is enforced
    /// before the team is handed back.
    async fn resolve_existing(
        &self,
        input: &ResolveTeamInput,
    ) -> Result<Option<Team>, ProvisionError> {
        if let Some(id) = input.team_id {
            let team = self.teams.get_by_id(id).await?;
            self.check_domain_allowed(&team, input.domain.as_deref())
                .await?;
            debug!(team_id = %team.id, "resolved team from explicit id");
            return Ok(Some(team));
        }

        if let Some(domain) = input.domain.as_deref() {
            if let Some(team_domain) = self.domains.find_by_name(domain).await? {
                // An allow-list match wins over everything else; the
                // requested name/subdomain are ignored for existing teams.
                let team = self.teams.get_by_id(team_domain.team_id).await?;
                debug!(team_id = %team.id, domain, "resolved team from allow-listed domain");
                return Ok(Some(team));
            }
        }

        if let Some(provider) = self
            .providers
            .find_by_key(&input.provider_name, &input.provider_id)
            .await?
        {
            let team = self.teams.get_by_id(provider.team_id).await?;
            self.check_domain_allowed(&team, input.domain.as_deref())
                .await?;
            debug!(team_id = %team.id, provider = %input.provider_name, "resolved team from provider key");
            return Ok(Some(team));
        }

        Ok(None)
    }

    /// Probe for a free subdomain and create the team. A creation that
    /// loses the race to a concurrent sign-up comes back as a conflict
    /// from the storage layer; the probe is re-run once and the create
    /// retried before giving up.
    async fn create_with_available_subdomain(
        &self,
        input: &ResolveTeamInput,
    ) -> Result<Team, ProvisionError> {
        let mut attempted_retry = false;
        loop {
            let subdomain = resolve_available_subdomain(self.teams, &input.subdomain).await?;
            match self
                .teams
                .create(CreateTeam {
                    name: input.name.clone(),
                    subdomain: Some(subdomain.clone()),
                    avatar_url: input.avatar_url.clone(),
                })
                .await
            {
                Ok(team) => {
                    info!(team_id = %team.id, subdomain = %subdomain, "created team");
                    return Ok(team);
                }
                Err(TomeError::Conflict { .. }) if !attempted_retry => {
                    debug!(
                        subdomain = %subdomain,
                        "subdomain taken concurrently, retrying probe"
                    );
                    attempted_retry = true;
                }
                Err(TomeError::Conflict { .. }) => {
                    return Err(ProvisionError::SubdomainExhausted {
                        subdomain: input.subdomain.clone(),
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// A team that restricts sign-in domains rejects any sign-in whose
    /// domain is absent from the allow-list. Teams with an empty list
    /// accept every domain.
    async fn check_domain_allowed(
        &self,
        team: &Team,
        domain: Option<&str>,
    ) -> Result<(), ProvisionError> {
        let Some(domain) = domain else {
            return Ok(());
        };
        let allowed = self.domains.list_by_team(team.id).await?;
        if allowed.is_empty()
            || allowed.iter().any(|d| d.name.eq_ignore_ascii_case(domain))
        {
            Ok(())
        } else {
            Err(ProvisionError::DomainNotAllowed {
                domain: domain.to_string(),
            })
        }
    }
}
