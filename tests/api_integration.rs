// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the REST client and identity resolution,
//! using wiremock.

use decora_bridge::api::{ApiClient, ApiConfig, SwitchUpdate};
use decora_bridge::registry::DeviceDescriptor;
use decora_bridge::resolve::resolve;
use decora_bridge::types::{Brightness, CapabilityProfile, LevelBounds, PowerState};
use decora_bridge::{ApiError, ResolveError};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    ApiConfig::new()
        .with_base_url(server.uri())
        .into_client()
        .unwrap()
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/Person/login"))
        .and(query_param("include", "user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "tok1",
            "userId": "p1"
        })))
        .mount(server)
        .await;
}

// ============================================================================
// ApiClient tests
// ============================================================================

mod api_client {
    use super::*;

    #[tokio::test]
    async fn login_returns_session() {
        let server = MockServer::start().await;
        mount_login(&server).await;

        let client = client_for(&server);
        let session = client.login("a@b.com", "x").await.unwrap();

        assert_eq!(session.token(), "tok1");
        assert_eq!(session.person_id(), "p1");
    }

    #[tokio::test]
    async fn login_rejection_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Person/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client_for(&server).login("a@b.com", "wrong").await;
        assert!(matches!(result, Err(ApiError::Auth(_))));
    }

    #[tokio::test]
    async fn login_malformed_body_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Person/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "tok1"})),
            )
            .mount(&server)
            .await;

        let result = client_for(&server).login("a@b.com", "x").await;
        assert!(matches!(result, Err(ApiError::Auth(_))));
    }

    #[tokio::test]
    async fn permissions_carry_access_token_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Person/p1/residentialPermissions"))
            .and(header("X-Access-Token", "tok1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"residentialAccountId": "acc1"}
            ])))
            .mount(&server)
            .await;

        let permissions = client_for(&server)
            .person_permissions("p1", "tok1")
            .await
            .unwrap();
        assert_eq!(permissions.len(), 1);
        assert_eq!(permissions[0].residential_account_id, "acc1");
    }

    #[tokio::test]
    async fn upstream_failure_carries_status_and_operation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ResidentialAccounts/acc1"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let result = client_for(&server).account("acc1", "tok1").await;
        assert!(matches!(
            result,
            Err(ApiError::Upstream {
                status: 502,
                operation: "account"
            })
        ));
    }

    #[tokio::test]
    async fn empty_device_list_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Residences/res1/iotSwitches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let devices = client_for(&server)
            .residence_switches("res1", "tok1")
            .await
            .unwrap();
        assert!(devices.is_empty());
    }

    #[tokio::test]
    async fn read_missing_device_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/IotSwitches/5"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client_for(&server).switch_state(5, "tok1").await;
        assert!(matches!(result, Err(ApiError::NotFound { device_id: 5 })));
    }

    #[tokio::test]
    async fn write_sends_only_set_fields() {
        let server = MockServer::start().await;
        // Exact body match: a power-only update must not carry brightness.
        Mock::given(method("PUT"))
            .and(path("/IotSwitches/5"))
            .and(header("X-Access-Token", "tok1"))
            .and(body_json(serde_json::json!({"power": "ON"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "power": "ON",
                "brightness": 100
            })))
            .mount(&server)
            .await;

        let state = client_for(&server)
            .set_switch_state(5, "tok1", &SwitchUpdate::power(PowerState::On))
            .await
            .unwrap();
        assert_eq!(state.power, Some(PowerState::On));
        assert_eq!(state.brightness, Some(Brightness::new(100).unwrap()));
    }

    #[tokio::test]
    async fn write_missing_device_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/IotSwitches/5"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client_for(&server)
            .set_switch_state(5, "tok1", &SwitchUpdate::power(PowerState::Off))
            .await;
        assert!(matches!(result, Err(ApiError::NotFound { device_id: 5 })));
    }
}

// ============================================================================
// Identity resolution pipeline tests
// ============================================================================

mod pipeline {
    use super::*;

    async fn mount_chain(server: &MockServer, devices: serde_json::Value) {
        mount_login(server).await;
        Mock::given(method("GET"))
            .and(path("/Person/p1/residentialPermissions"))
            .and(header("X-Access-Token", "tok1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"residentialAccountId": "acc1"}
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ResidentialAccounts/acc1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "primaryResidenceId": "res1"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Residences/res1/iotSwitches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(devices))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn resolves_devices_from_primary_residence() {
        let server = MockServer::start().await;
        mount_chain(
            &server,
            serde_json::json!([
                {"id": 5, "serial": "S5", "name": "Hallway", "model": "DW15S"}
            ]),
        )
        .await;

        let client = client_for(&server);
        let resolution = resolve(&client, "a@b.com", "x").await.unwrap();

        assert_eq!(resolution.session.token(), "tok1");
        assert_eq!(resolution.context.account_id, "acc1");
        assert_eq!(resolution.context.residence_id, "res1");
        assert_eq!(resolution.devices.len(), 1);

        // Unrecognized model string lands on the switch profile.
        let descriptor = DeviceDescriptor::from(&resolution.devices[0]);
        assert_eq!(descriptor.profile, CapabilityProfile::Switch);
        assert_eq!(descriptor.serial, "S5");
    }

    #[tokio::test]
    async fn empty_primary_residence_falls_back_to_account_residences() {
        let server = MockServer::start().await;
        mount_chain(&server, serde_json::json!([])).await;
        Mock::given(method("GET"))
            .and(path("/ResidentialAccounts/acc1/residences"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "res2"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Residences/res2/iotSwitches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": 7, "serial": "S7", "name": "Ceiling Fan", "model": "DW4SF"}
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let resolution = resolve(&client, "a@b.com", "x").await.unwrap();

        assert_eq!(resolution.context.residence_id, "res2");
        assert_eq!(resolution.devices[0].serial, "S7");
    }

    #[tokio::test]
    async fn no_devices_anywhere_names_both_residences() {
        let server = MockServer::start().await;
        mount_chain(&server, serde_json::json!([])).await;
        Mock::given(method("GET"))
            .and(path("/ResidentialAccounts/acc1/residences"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "res2"}
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/Residences/res2/iotSwitches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = resolve(&client, "a@b.com", "x").await;

        let Err(ResolveError::NoDevices { primary, fallback }) = result else {
            panic!("expected NoDevices, got {result:?}");
        };
        assert_eq!(primary, "res1");
        assert_eq!(fallback.as_deref(), Some("res2"));
    }

    #[tokio::test]
    async fn empty_permissions_fail_resolution() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/Person/p1/residentialPermissions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = resolve(&client, "a@b.com", "x").await;
        assert!(matches!(result, Err(ResolveError::NoPermissions)));
    }

    #[tokio::test]
    async fn failed_step_is_named_in_the_error() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/Person/p1/residentialPermissions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = resolve(&client, "a@b.com", "x").await;
        assert!(matches!(
            result,
            Err(ResolveError::Step {
                step: "person_permissions",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn bad_credentials_abort_at_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Person/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = resolve(&client, "a@b.com", "wrong").await;
        assert!(matches!(
            result,
            Err(ResolveError::Step {
                step: "login",
                source: ApiError::Auth(_)
            })
        ));
    }

    #[tokio::test]
    async fn fan_device_state_derives_speed_bounds() {
        let server = MockServer::start().await;
        mount_chain(
            &server,
            serde_json::json!([
                {"id": 7, "serial": "S7", "name": "Ceiling Fan", "model": "DW4SF"}
            ]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/IotSwitches/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "power": "ON",
                "brightness": 40,
                "minLevel": 1,
                "maxLevel": 100
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let resolution = resolve(&client, "a@b.com", "x").await.unwrap();
        let descriptor = DeviceDescriptor::from(&resolution.devices[0]);
        assert_eq!(descriptor.profile, CapabilityProfile::Fan);

        let state = client
            .switch_state(descriptor.remote_id, resolution.session.token())
            .await
            .unwrap();
        assert_eq!(state.brightness, Some(Brightness::new(40).unwrap()));

        let mut device_state = decora_bridge::DeviceState::new();
        device_state.apply(&(&state).into());
        assert_eq!(
            device_state.level_bounds(descriptor.profile),
            Some(LevelBounds {
                min: 0,
                max: 100,
                step: 1
            })
        );
    }
}
