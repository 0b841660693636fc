//! API router.
//!
//! Routes are nested under `/api`. Register, login, department seeding
//! and the health check are open; everything else sits behind the
//! bearer auth middleware.
//!
//! Handlers use `State(ApiContext)`; middleware reads the same context
//! from an outermost `Extension` layer.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

pub fn api_router(ctx: ApiContext) -> Router {
    // Path params use `:param` syntax (matchit 0.7 / axum 0.7).
    let protected = Router::new()
        .route("/auth/logout", post(endpoints::auth::logout))
        .route(
            "/appointments",
            get(endpoints::appointments::list).post(endpoints::appointments::create),
        )
        .route(
            "/appointments/patient/:id",
            get(endpoints::appointments::by_patient),
        )
        .route(
            "/appointments/doctor/:id",
            get(endpoints::appointments::by_doctor),
        )
        .route(
            "/appointments/:id",
            patch(endpoints::appointments::update).delete(endpoints::appointments::delete),
        )
        .route("/prescriptions", post(endpoints::prescriptions::create))
        .route(
            "/prescriptions/pending",
            get(endpoints::prescriptions::pending),
        )
        .route("/prescriptions/mine", get(endpoints::prescriptions::mine))
        .route(
            "/prescriptions/patient/:id",
            get(endpoints::prescriptions::by_patient),
        )
        .route(
            "/prescriptions/doctor/:id",
            get(endpoints::prescriptions::by_doctor),
        )
        .route(
            "/prescriptions/:id",
            patch(endpoints::prescriptions::update),
        )
        .route(
            "/prescriptions/:id/approve",
            patch(endpoints::prescriptions::approve),
        )
        .route(
            "/prescriptions/:id/reject",
            patch(endpoints::prescriptions::reject),
        )
        .route(
            "/prescriptions/:id/dispense",
            patch(endpoints::prescriptions::dispense),
        )
        .route("/patients", get(endpoints::patients::list))
        .route(
            "/patients/:id",
            get(endpoints::patients::get).patch(endpoints::patients::update),
        )
        .route(
            "/patients/:id/history",
            post(endpoints::patients::add_history),
        )
        .route("/doctors", get(endpoints::doctors::list))
        .route(
            "/doctors/:id",
            get(endpoints::doctors::get)
                .patch(endpoints::doctors::update)
                .delete(endpoints::doctors::delete),
        )
        .route("/departments", get(endpoints::departments::list))
        .route("/payments", post(endpoints::payments::create))
        .route("/payments/:id", patch(endpoints::payments::update))
        .route(
            "/payments/patient/:id",
            get(endpoints::payments::by_patient),
        )
        .route("/lab-reports", post(endpoints::lab_reports::create))
        .route(
            "/lab-reports/patient/:id",
            get(endpoints::lab_reports::by_patient),
        )
        .route("/notifications", get(endpoints::notifications::list))
        .route(
            "/notifications/:id/read",
            patch(endpoints::notifications::mark_read),
        )
        .route("/admin/analytics", get(endpoints::admin::analytics))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::auth::require_auth))
        // Extension must be outermost so the middleware can see ApiContext
        .layer(axum::Extension(ctx.clone()));

    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/auth/register", post(endpoints::auth::register))
        .route("/auth/login", post(endpoints::auth::login))
        .route("/departments/seed", post(endpoints::departments::seed))
        .with_state(ctx.clone())
        .layer(axum::Extension(ctx));

    Router::new()
        .nest("/api", protected)
        .nest("/api", unprotected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::db::sqlite::open_memory_database;

    fn test_router() -> Router {
        let conn = open_memory_database().unwrap();
        api_router(ApiContext::new(conn))
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Register a user through the API and log in, returning the token
    /// and the registered user object.
    async fn register_and_login(router: &Router, name: &str, role: &str) -> (String, Value) {
        let email = format!("{}@hospital.test", uuid::Uuid::new_v4());
        let (status, registered) = send(
            router,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "name": name,
                "email": email,
                "password": "secret-pw",
                "role": role,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, login) = send(
            router,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": email, "password": "secret-pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = login["data"]["token"].as_str().unwrap().to_string();
        (token, registered["data"].clone())
    }

    /// A doctor and a patient plus one appointment between them.
    async fn seed_consultation(
        router: &Router,
    ) -> (String, Value, String, Value, String) {
        let (doctor_token, doctor_user) = register_and_login(router, "Dr. Chen", "Doctor").await;
        let (patient_token, patient_user) =
            register_and_login(router, "Ada Smith", "Patient").await;

        let doctor_user_id = doctor_user["id"].as_str().unwrap();
        let (_, doctors) = send(router, "GET", "/api/doctors", Some(&doctor_token), None).await;
        let doctor_id = doctors["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|d| d["user_id"] == doctor_user_id)
            .unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();

        // Patient profile ids are only listed on the admin roster
        let (admin_token, _) = register_and_login(router, "Roster Admin", "Admin").await;
        let (_, patients_resp) =
            send(router, "GET", "/api/patients", Some(&admin_token), None).await;
        let patient_user_id = patient_user["id"].as_str().unwrap();
        let patient_id = patients_resp["data"]
            .as_array()
            .unwrap()
            .iter()
            .find(|p| p["user_id"] == patient_user_id)
            .unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string();

        let (status, appointment) = send(
            router,
            "POST",
            "/api/appointments",
            Some(&doctor_token),
            Some(json!({
                "patient_id": patient_id,
                "doctor_id": doctor_id,
                "date": "2025-06-01",
                "time": "10:30",
                "reason": "Checkup",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let appointment_id = appointment["data"]["id"].as_str().unwrap().to_string();

        (
            doctor_token,
            json!({"id": doctor_id, "patient_id": patient_id}),
            patient_token,
            json!({"id": patient_id}),
            appointment_id,
        )
    }

    #[tokio::test]
    async fn health_is_open() {
        let router = test_router();
        let (status, body) = send(&router, "GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn protected_routes_require_token() {
        let router = test_router();
        let (status, body) = send(&router, "GET", "/api/appointments", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);

        let (status, _) =
            send(&router, "GET", "/api/appointments", Some("bogus-token"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn register_rejects_duplicate_email() {
        let router = test_router();
        let payload = json!({
            "name": "Ada",
            "email": "ada@hospital.test",
            "password": "pw",
            "role": "Patient",
        });
        let (status, _) =
            send(&router, "POST", "/api/auth/register", None, Some(payload.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) =
            send(&router, "POST", "/api/auth/register", None, Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email is already registered");
    }

    #[tokio::test]
    async fn register_requires_fields() {
        let router = test_router();
        let (status, body) = send(
            &router,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({"name": "Ada", "email": "a@b.c", "role": "Patient"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "password is required");
    }

    #[tokio::test]
    async fn register_never_leaks_password_hash() {
        let router = test_router();
        let (_, user) = register_and_login(&router, "Ada", "Patient").await;
        assert!(user.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let router = test_router();
        register_and_login(&router, "Ada", "Patient").await;
        let (status, body) = send(
            &router,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({"email": "nobody@hospital.test", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid email or password");
    }

    #[tokio::test]
    async fn logout_revokes_the_token() {
        let router = test_router();
        let (token, _) = register_and_login(&router, "Ada", "Patient").await;

        let (status, _) =
            send(&router, "POST", "/api/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&router, "GET", "/api/appointments", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn seeding_is_open_and_idempotent() {
        let router = test_router();
        let (status, body) =
            send(&router, "POST", "/api/departments/seed", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["inserted"], 16);
        assert_eq!(body["data"]["total"], 16);

        let (_, body) = send(&router, "POST", "/api/departments/seed", None, None).await;
        assert_eq!(body["data"]["inserted"], 0);
        assert_eq!(body["data"]["total"], 16);
    }

    #[tokio::test]
    async fn appointment_create_missing_time_is_400() {
        let router = test_router();
        let (token, _) = register_and_login(&router, "Ada", "Patient").await;
        let (status, body) = send(
            &router,
            "POST",
            "/api/appointments",
            Some(&token),
            Some(json!({
                "patient_id": uuid::Uuid::new_v4(),
                "doctor_id": uuid::Uuid::new_v4(),
                "date": "2025-06-01",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "time is required");
    }

    #[tokio::test]
    async fn appointment_defaults_to_pending_and_lists_with_count() {
        let router = test_router();
        let (doctor_token, _, _, _, _) = seed_consultation(&router).await;

        let (status, body) =
            send(&router, "GET", "/api/appointments", Some(&doctor_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["status"], "Pending");
        assert_eq!(body["data"][0]["doctor_name"], "Dr. Chen");
    }

    #[tokio::test]
    async fn illegal_appointment_transition_is_400() {
        let router = test_router();
        let (doctor_token, _, _, _, appointment_id) = seed_consultation(&router).await;

        let uri = format!("/api/appointments/{appointment_id}");
        let (status, _) = send(
            &router,
            "PATCH",
            &uri,
            Some(&doctor_token),
            Some(json!({"status": "Completed"})),
        )
        .await;
        // Pending cannot jump straight to Completed
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &router,
            "PATCH",
            &uri,
            Some(&doctor_token),
            Some(json!({"status": "Confirmed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "Confirmed");
    }

    #[tokio::test]
    async fn unknown_appointment_is_404() {
        let router = test_router();
        let (token, _) = register_and_login(&router, "Ada", "Patient").await;
        let uri = format!("/api/appointments/{}", uuid::Uuid::new_v4());
        let (status, body) = send(
            &router,
            "PATCH",
            &uri,
            Some(&token),
            Some(json!({"status": "Confirmed"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn prescription_flow_completes_appointment() {
        let router = test_router();
        let (doctor_token, ids, _, _, appointment_id) = seed_consultation(&router).await;

        let (status, rx) = send(
            &router,
            "POST",
            "/api/prescriptions",
            Some(&doctor_token),
            Some(json!({
                "patient_id": ids["patient_id"],
                "appointment_id": appointment_id,
                "diagnosis": "Flu",
                "medicines": [{"name": "Paracetamol", "dosage": "500mg"}],
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(rx["data"]["status"], "PENDING");

        let (_, list) =
            send(&router, "GET", "/api/appointments", Some(&doctor_token), None).await;
        assert_eq!(list["data"][0]["status"], "Completed");
    }

    #[tokio::test]
    async fn pharmacy_queue_requires_pharmacist() {
        let router = test_router();
        let (patient_token, _) = register_and_login(&router, "Ada", "Patient").await;
        let (status, _) = send(
            &router,
            "GET",
            "/api/prescriptions/pending",
            Some(&patient_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (pharm_token, _) = register_and_login(&router, "Pharm", "Pharmacist").await;
        let (status, body) = send(
            &router,
            "GET",
            "/api/prescriptions/pending",
            Some(&pharm_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
    }

    #[tokio::test]
    async fn reject_without_notes_is_400() {
        let router = test_router();
        let (doctor_token, ids, _, _, appointment_id) = seed_consultation(&router).await;
        let (_, rx) = send(
            &router,
            "POST",
            "/api/prescriptions",
            Some(&doctor_token),
            Some(json!({
                "patient_id": ids["patient_id"],
                "appointment_id": appointment_id,
            })),
        )
        .await;
        let rx_id = rx["data"]["id"].as_str().unwrap();

        let (pharm_token, _) = register_and_login(&router, "Pharm", "Pharmacist").await;
        let uri = format!("/api/prescriptions/{rx_id}/reject");
        let (status, _) = send(&router, "PATCH", &uri, Some(&pharm_token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &router,
            "PATCH",
            &uri,
            Some(&pharm_token),
            Some(json!({"notes": "Out of stock"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "REJECTED");
        assert_eq!(body["data"]["pharmacy_notes"], "Out of stock");
    }

    #[tokio::test]
    async fn approve_then_dispense() {
        let router = test_router();
        let (doctor_token, ids, patient_token, _, appointment_id) =
            seed_consultation(&router).await;
        let (_, rx) = send(
            &router,
            "POST",
            "/api/prescriptions",
            Some(&doctor_token),
            Some(json!({
                "patient_id": ids["patient_id"],
                "appointment_id": appointment_id,
            })),
        )
        .await;
        let rx_id = rx["data"]["id"].as_str().unwrap();

        let (pharm_token, _) = register_and_login(&router, "Pharm", "Pharmacist").await;
        let (status, body) = send(
            &router,
            "PATCH",
            &format!("/api/prescriptions/{rx_id}/approve"),
            Some(&pharm_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["pharmacy_notes"], "Approved by pharmacist");

        let (status, body) = send(
            &router,
            "PATCH",
            &format!("/api/prescriptions/{rx_id}/dispense"),
            Some(&pharm_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "DISPENSED");

        // Approval notified the patient
        let (_, inbox) = send(
            &router,
            "GET",
            "/api/notifications",
            Some(&patient_token),
            None,
        )
        .await;
        assert!(inbox["data"]
            .as_array()
            .unwrap()
            .iter()
            .any(|n| n["title"] == "Prescription approved"));
    }

    #[tokio::test]
    async fn patient_cannot_read_another_patients_prescriptions() {
        let router = test_router();
        let (_, ids, _, _, _) = seed_consultation(&router).await;
        let (stranger_token, _) = register_and_login(&router, "Eve", "Patient").await;

        let uri = format!(
            "/api/prescriptions/patient/{}",
            ids["patient_id"].as_str().unwrap()
        );
        let (status, _) = send(&router, "GET", &uri, Some(&stranger_token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn payment_lifecycle_over_http() {
        let router = test_router();
        let (_, ids, patient_token, _, _) = seed_consultation(&router).await;

        let (status, payment) = send(
            &router,
            "POST",
            "/api/payments",
            Some(&patient_token),
            Some(json!({
                "patient_id": ids["patient_id"],
                "amount": 100.0,
                "method": "Card",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(payment["data"]["status"], "Pending");
        let payment_id = payment["data"]["id"].as_str().unwrap();

        let (status, body) = send(
            &router,
            "PATCH",
            &format!("/api/payments/{payment_id}"),
            Some(&patient_token),
            Some(json!({"status": "Paid", "transaction_id": "tx-1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "Paid");

        // Terminal state, second settle fails
        let (status, _) = send(
            &router,
            "PATCH",
            &format!("/api/payments/{payment_id}"),
            Some(&patient_token),
            Some(json!({"status": "Failed"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analytics_is_admin_only() {
        let router = test_router();
        let (patient_token, _) = register_and_login(&router, "Ada", "Patient").await;
        let (status, _) = send(
            &router,
            "GET",
            "/api/admin/analytics",
            Some(&patient_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (admin_token, _) = register_and_login(&router, "Root", "Admin").await;
        let (status, body) = send(
            &router,
            "GET",
            "/api/admin/analytics",
            Some(&admin_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"]["charts"]["appointment_trend"]
                .as_array()
                .unwrap()
                .len(),
            7
        );
        assert_eq!(body["data"]["summary"]["total_patients"], 1);
    }

    #[tokio::test]
    async fn patients_list_is_admin_only() {
        let router = test_router();
        let (patient_token, _) = register_and_login(&router, "Ada", "Patient").await;
        let (status, _) =
            send(&router, "GET", "/api/patients", Some(&patient_token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn doctor_delete_is_admin_only() {
        let router = test_router();
        let (doctor_token, ids, _, _, _) = seed_consultation(&router).await;
        let uri = format!("/api/doctors/{}", ids["id"].as_str().unwrap());

        let (status, _) = send(&router, "DELETE", &uri, Some(&doctor_token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (admin_token, _) = register_and_login(&router, "Root", "Admin").await;
        let (status, _) = send(&router, "DELETE", &uri, Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&router, "GET", &uri, Some(&admin_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sort_asymmetry_between_patient_and_doctor_views() {
        let router = test_router();
        let (doctor_token, ids, _, _, _) = seed_consultation(&router).await;
        // A second, earlier appointment
        let (status, _) = send(
            &router,
            "POST",
            "/api/appointments",
            Some(&doctor_token),
            Some(json!({
                "patient_id": ids["patient_id"],
                "doctor_id": ids["id"],
                "date": "2025-05-01",
                "time": "08:00",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let patient_uri = format!(
            "/api/appointments/patient/{}",
            ids["patient_id"].as_str().unwrap()
        );
        let (_, patient_view) =
            send(&router, "GET", &patient_uri, Some(&doctor_token), None).await;
        assert_eq!(patient_view["data"][0]["date"], "2025-06-01");
        assert_eq!(patient_view["data"][1]["date"], "2025-05-01");

        let doctor_uri = format!("/api/appointments/doctor/{}", ids["id"].as_str().unwrap());
        let (_, doctor_view) =
            send(&router, "GET", &doctor_uri, Some(&doctor_token), None).await;
        assert_eq!(doctor_view["data"][0]["date"], "2025-05-01");
        assert_eq!(doctor_view["data"][1]["date"], "2025-06-01");
    }

    #[tokio::test]
    async fn lab_report_creation_requires_doctor() {
        let router = test_router();
        let (_, ids, patient_token, _, _) = seed_consultation(&router).await;
        let payload = json!({
            "patient_id": ids["patient_id"],
            "test_name": "CBC",
        });

        let (status, _) = send(
            &router,
            "POST",
            "/api/lab-reports",
            Some(&patient_token),
            Some(payload.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn lab_report_round_trip() {
        let router = test_router();
        let (doctor_token, ids, _, _, _) = seed_consultation(&router).await;

        let (status, report) = send(
            &router,
            "POST",
            "/api/lab-reports",
            Some(&doctor_token),
            Some(json!({
                "patient_id": ids["patient_id"],
                "test_name": "CBC",
                "result": "Normal",
                "status": "Completed",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(report["data"]["status"], "Completed");

        let uri = format!(
            "/api/lab-reports/patient/{}",
            ids["patient_id"].as_str().unwrap()
        );
        let (_, list) = send(&router, "GET", &uri, Some(&doctor_token), None).await;
        assert_eq!(list["count"], 1);
        assert_eq!(list["data"][0]["test_name"], "CBC");
    }

    #[tokio::test]
    async fn notification_mark_read_is_owner_scoped() {
        let router = test_router();
        let (doctor_token, ids, patient_token, _, appointment_id) =
            seed_consultation(&router).await;

        // Confirming the appointment notifies the patient
        let (status, _) = send(
            &router,
            "PATCH",
            &format!("/api/appointments/{appointment_id}"),
            Some(&doctor_token),
            Some(json!({"status": "Confirmed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        drop(ids);

        let (_, inbox) = send(
            &router,
            "GET",
            "/api/notifications",
            Some(&patient_token),
            None,
        )
        .await;
        let note_id = inbox["data"][0]["id"].as_str().unwrap();

        // Another user cannot mark it
        let uri = format!("/api/notifications/{note_id}/read");
        let (status, _) = send(&router, "PATCH", &uri, Some(&doctor_token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&router, "PATCH", &uri, Some(&patient_token), None).await;
        assert_eq!(status, StatusCode::OK);
        let (_, inbox) = send(
            &router,
            "GET",
            "/api/notifications",
            Some(&patient_token),
            None,
        )
        .await;
        assert_eq!(inbox["data"][0]["read"], true);
    }

    #[tokio::test]
    async fn patient_update_applies_emergency_contact() {
        let router = test_router();
        let (_, ids, patient_token, _, _) = seed_consultation(&router).await;
        let patient_id = ids["patient_id"].as_str().unwrap();

        let uri = format!("/api/patients/{patient_id}");
        let (status, _) = send(
            &router,
            "PATCH",
            &uri,
            Some(&patient_token),
            Some(json!({
                "phone": "555-0150",
                "emergency_contact": {
                    "name": "Grace Smith",
                    "relationship": "mother",
                    "phone": "555-0151",
                },
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, detail) = send(&router, "GET", &uri, Some(&patient_token), None).await;
        assert_eq!(detail["data"]["phone"], "555-0150");
        assert_eq!(detail["data"]["emergency_contact"]["name"], "Grace Smith");
        assert_eq!(
            detail["data"]["emergency_contact"]["relationship"],
            "mother"
        );
    }

    #[tokio::test]
    async fn medical_history_written_by_doctor_shows_on_detail() {
        let router = test_router();
        let (doctor_token, ids, patient_token, _, _) = seed_consultation(&router).await;
        let patient_id = ids["patient_id"].as_str().unwrap();
        let uri = format!("/api/patients/{patient_id}/history");

        // Patients cannot write their own record
        let (status, _) = send(
            &router,
            "POST",
            &uri,
            Some(&patient_token),
            Some(json!({"condition": "Asthma"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = send(
            &router,
            "POST",
            &uri,
            Some(&doctor_token),
            Some(json!({"condition": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "condition is required");

        let (status, entry) = send(
            &router,
            "POST",
            &uri,
            Some(&doctor_token),
            Some(json!({
                "condition": "Asthma",
                "date": "2021-06-01",
                "notes": "Mild, inhaler prescribed",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry["data"]["condition"], "Asthma");

        let (_, detail) = send(
            &router,
            "GET",
            &format!("/api/patients/{patient_id}"),
            Some(&patient_token),
            None,
        )
        .await;
        let history = detail["data"]["medical_history"].as_array().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["condition"], "Asthma");
        assert_eq!(history[0]["date"], "2021-06-01");
    }

    #[tokio::test]
    async fn unknown_enum_value_keeps_error_envelope() {
        let router = test_router();
        let (doctor_token, _, _, _, appointment_id) = seed_consultation(&router).await;

        let (status, body) = send(
            &router,
            "PATCH",
            &format!("/api/appointments/{appointment_id}"),
            Some(&doctor_token),
            Some(json!({"status": "NoShow"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("status"));
    }
}
