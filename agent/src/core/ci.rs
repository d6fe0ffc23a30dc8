//! CI context resolution
//!
//! Each supported CI system is recognized by a marker variable; when one is
//! present, the environment variables matching its prefixes are snapshotted
//! into the start-run payload.

use std::collections::HashMap;
use std::env;

use shared::messages::CiContextPayload;

struct CiResolver {
    ci_type: &'static str,
    marker: &'static str,
    prefixes: &'static [&'static str],
}

const RESOLVERS: &[CiResolver] = &[
    CiResolver {
        ci_type: "JENKINS",
        marker: "JENKINS_URL",
        prefixes: &[
            "CVS_", "SVN_", "GIT_", "NODE_", "EXECUTOR_NUMBER", "JENKINS_", "JOB_", "BUILD_",
            "ROOT_BUILD_", "RUN_", "WORKSPACE",
        ],
    },
    CiResolver {
        ci_type: "TEAM_CITY",
        marker: "TEAMCITY_VERSION",
        prefixes: &["BUILD_", "HOSTNAME", "SERVER_URL", "TEAMCITY_"],
    },
    CiResolver {
        ci_type: "CIRCLE_CI",
        marker: "CIRCLECI",
        prefixes: &["CIRCLE", "HOSTNAME"],
    },
    CiResolver {
        ci_type: "TRAVIS_CI",
        marker: "TRAVIS",
        prefixes: &["TRAVIS", "USER"],
    },
];

fn collect_prefixed(prefixes: &[&str]) -> HashMap<String, String> {
    env::vars()
        .filter(|(name, _)| prefixes.iter().any(|prefix| name.starts_with(prefix)))
        .collect()
}

/// Detect the CI system this process runs under, if any.
pub fn resolve_ci_context() -> Option<CiContextPayload> {
    let resolver = RESOLVERS
        .iter()
        .find(|resolver| env::var(resolver.marker).is_ok())?;

    Some(CiContextPayload {
        ci_type: resolver.ci_type.to_string(),
        env_variables: collect_prefixed(resolver.prefixes),
    })
}
