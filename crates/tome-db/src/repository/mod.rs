//! SurrealDB repository implementations.

mod authentication_provider;
mod team;
mod team_domain;
mod user;

pub use authentication_provider::SurrealAuthenticationProviderRepository;
pub use team::SurrealTeamRepository;
pub use team_domain::SurrealTeamDomainRepository;
pub use user::SurrealUserRepository;
