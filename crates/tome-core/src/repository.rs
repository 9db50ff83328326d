//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Lookups that feed resolution
//! decisions return `Option` rather than a `NotFound` error, so callers
//! can branch without matching on error variants; `get_*` operations on a
//! known id still fail with `NotFound`.

use uuid::Uuid;

use crate::error::TomeResult;
use crate::models::{
    authentication_provider::{AuthenticationProvider, CreateAuthenticationProvider},
    team::{CreateTeam, Team, UpdateTeam},
    team_domain::{CreateTeamDomain, TeamDomain},
    user::{CreateUser, UpdateUser, User},
};

pub trait TeamRepository: Send + Sync {
    fn create(&self, input: CreateTeam) -> impl Future<Output = TomeResult<Team>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TomeResult<Team>> + Send;
    fn find_by_subdomain(
        &self,
        subdomain: &str,
    ) -> impl Future<Output = TomeResult<Option<Team>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTeam,
    ) -> impl Future<Output = TomeResult<Team>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = TomeResult<()>> + Send;
    fn count(&self) -> impl Future<Output = TomeResult<u64>> + Send;
    /// The oldest team, if any. A single-tenant installation holds at
    /// most one, so this is "the" team there.
    fn first(&self) -> impl Future<Output = TomeResult<Option<Team>>> + Send;
}

pub trait AuthenticationProviderRepository: Send + Sync {
    fn create(
        &self,
        input: CreateAuthenticationProvider,
    ) -> impl Future<Output = TomeResult<AuthenticationProvider>> + Send;
    /// Look up a provider account anywhere in the installation. A match
    /// identifies the team a returning sign-in belongs to.
    fn find_by_key(
        &self,
        name: &str,
        provider_id: &str,
    ) -> impl Future<Output = TomeResult<Option<AuthenticationProvider>>> + Send;
    fn find_by_team_and_key(
        &self,
        team_id: Uuid,
        name: &str,
        provider_id: &str,
    ) -> impl Future<Output = TomeResult<Option<AuthenticationProvider>>> + Send;
    fn list_by_team(
        &self,
        team_id: Uuid,
    ) -> impl Future<Output = TomeResult<Vec<AuthenticationProvider>>> + Send;
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = TomeResult<User>> + Send;
    fn find_by_service_id(
        &self,
        team_id: Uuid,
        service_id: &str,
    ) -> impl Future<Output = TomeResult<Option<User>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = TomeResult<User>> + Send;
}

pub trait TeamDomainRepository: Send + Sync {
    fn create(
        &self,
        input: CreateTeamDomain,
    ) -> impl Future<Output = TomeResult<TeamDomain>> + Send;
    fn find_by_name(
        &self,
        name: &str,
    ) -> impl Future<Output = TomeResult<Option<TeamDomain>>> + Send;
    fn list_by_team(
        &self,
        team_id: Uuid,
    ) -> impl Future<Output = TomeResult<Vec<TeamDomain>>> + Send;
}
