// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Startup identity resolution.
//!
//! A strict sequential chain of dependent lookups turns credentials into
//! a session and a device list: login -> person permissions -> account ->
//! primary residence -> devices. Each step needs the previous step's
//! output; a failure anywhere aborts the pipeline and surfaces a single
//! aggregate error naming the failed step. The pipeline is atomic: it
//! either produces the full resolution or nothing.

use crate::api::{ApiClient, RawSwitch, Session};
use crate::error::{ApiError, ResolveError};

/// The account/residence pair the device list was resolved from.
///
/// Derived once at startup and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidenceContext {
    /// The residential account taken from the first permission entry.
    pub account_id: String,
    /// The residence whose device list was used.
    pub residence_id: String,
}

/// Successful output of the resolution pipeline.
#[derive(Debug)]
pub struct Resolution {
    /// The authenticated session.
    pub session: Session,
    /// The account and residence the devices belong to.
    pub context: ResidenceContext,
    /// The raw device records of the resolved residence.
    pub devices: Vec<RawSwitch>,
}

/// Runs the identity resolution pipeline once.
///
/// If the primary residence yields no devices, the account's residence
/// list is consulted and the first entry retried before giving up.
///
/// # Errors
///
/// Returns `ResolveError::Step` naming the failed lookup,
/// `ResolveError::NoPermissions` if the person has no residential
/// permissions, or `ResolveError::NoDevices` if no attempted residence
/// has any devices.
pub async fn resolve(
    client: &ApiClient,
    email: &str,
    password: &str,
) -> Result<Resolution, ResolveError> {
    let session = step("login", client.login(email, password).await)?;
    tracing::info!(person_id = %session.person_id(), "Logged in");

    let permissions = step(
        "person_permissions",
        client
            .person_permissions(session.person_id(), session.token())
            .await,
    )?;
    let Some(first) = permissions.first() else {
        tracing::error!(step = "person_permissions", "No residential permissions");
        return Err(ResolveError::NoPermissions);
    };
    let account_id = first.residential_account_id.clone();

    let account = step(
        "account",
        client.account(&account_id, session.token()).await,
    )?;
    let primary_residence = account.primary_residence_id;

    let devices = step(
        "residence_switches",
        client
            .residence_switches(&primary_residence, session.token())
            .await,
    )?;
    if !devices.is_empty() {
        tracing::info!(
            residence_id = %primary_residence,
            devices = devices.len(),
            "Resolved devices from primary residence"
        );
        return Ok(Resolution {
            session,
            context: ResidenceContext {
                account_id,
                residence_id: primary_residence,
            },
            devices,
        });
    }

    // The primary residence can legitimately be empty while another
    // residence on the account holds the devices.
    tracing::warn!(
        residence_id = %primary_residence,
        "Primary residence has no devices, trying account residences"
    );

    let residences = step(
        "account_residences",
        client.account_residences(&account_id, session.token()).await,
    )?;
    let Some(fallback) = residences.first() else {
        return Err(ResolveError::NoDevices {
            primary: primary_residence,
            fallback: None,
        });
    };
    let fallback_id = fallback.id.clone();

    let devices = step(
        "residence_switches_fallback",
        client
            .residence_switches(&fallback_id, session.token())
            .await,
    )?;
    if devices.is_empty() {
        return Err(ResolveError::NoDevices {
            primary: primary_residence,
            fallback: Some(fallback_id),
        });
    }

    tracing::info!(
        residence_id = %fallback_id,
        devices = devices.len(),
        "Resolved devices from fallback residence"
    );
    Ok(Resolution {
        session,
        context: ResidenceContext {
            account_id,
            residence_id: fallback_id,
        },
        devices,
    })
}

/// Logs a step failure and wraps it into the aggregate pipeline error.
fn step<T>(name: &'static str, result: Result<T, ApiError>) -> Result<T, ResolveError> {
    result.map_err(|source| {
        tracing::error!(step = name, error = %source, "Identity resolution step failed");
        ResolveError::Step { step: name, source }
    })
}
