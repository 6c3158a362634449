//! End-to-end request tests: auth gate, login, drill-down pages, CRUD
//! mutations, all through the real routes against a mock backend.

mod common;

use actix_web::body::MessageBody;
use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::test;
use httpmock::prelude::*;
use serde_json::json;

use common::*;

/// Log in through the form and return the session cookie plus a CSRF token.
macro_rules! login {
    ($app:expr, $server:expr) => {{
        $server
            .mock_async(|when, then| {
                when.method(POST).path("/usuario/login");
                then.status(200).json_body(json!({ "id_rol": 2, "nombre": "Ana Pérez" }));
            })
            .await;
        let resp = test::call_service(&$app, test::TestRequest::get().uri("/login").to_request()).await;
        let cookie = session_cookie(&resp).expect("login page starts a session");
        let html = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        let token = csrf_from(&html);
        let body = form_body(&[("cedula", TEST_CEDULA), ("csrf_token", token.as_str())]);
        let req = test::TestRequest::post()
            .uri("/login")
            .cookie(cookie)
            .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), "/proyectos");
        (session_cookie(&resp).expect("login refreshes the session"), token)
    }};
}

async fn body_text<B: MessageBody>(resp: ServiceResponse<B>) -> String {
    String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
}

fn post_form(uri: &str, cookie: Cookie<'static>, pairs: &[(&str, &str)]) -> test::TestRequest {
    test::TestRequest::post()
        .uri(uri)
        .cookie(cookie)
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload(form_body(pairs))
}

#[actix_rt::test]
async fn anonymous_requests_are_sent_to_login() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);

    for uri in ["/", "/proyectos", "/admin/ciudad", "/estructuras/1/actividades"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{uri}");
        assert_eq!(location(&resp), "/login", "{uri}");
    }

    let resp = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Cédula"));
}

#[actix_rt::test]
async fn login_without_csrf_is_forbidden() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let backend = server
        .mock_async(|when, then| {
            when.method(POST).path("/usuario/login");
            then.status(200).json_body(json!({ "id_rol": 1 }));
        })
        .await;

    let req = test::TestRequest::post()
        .uri("/login")
        .insert_header(("Content-Type", "application/x-www-form-urlencoded"))
        .set_payload(form_body(&[("cedula", TEST_CEDULA), ("csrf_token", "forged")]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    backend.assert_calls_async(0).await;
}

#[actix_rt::test]
async fn unknown_cedula_shows_error_on_login_page() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    server
        .mock_async(|when, then| {
            when.method(POST).path("/usuario/login");
            then.status(404).json_body(json!({ "message": "Usuario no encontrado" }));
        })
        .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
    let cookie = session_cookie(&resp).unwrap();
    let token = csrf_from(&body_text(resp).await);

    let resp = test::call_service(&app, post_form("/login", cookie, &[("cedula", TEST_CEDULA), ("csrf_token", token.as_str())]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Cédula no registrada o sin acceso"));
}

#[actix_rt::test]
async fn malformed_cedula_never_reaches_backend() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let backend = server
        .mock_async(|when, then| {
            when.method(POST).path("/usuario/login");
            then.status(200).json_body(json!({ "id_rol": 1 }));
        })
        .await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
    let cookie = session_cookie(&resp).unwrap();
    let token = csrf_from(&body_text(resp).await);

    let resp = test::call_service(&app, post_form("/login", cookie, &[("cedula", "12ab"), ("csrf_token", token.as_str())]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    backend.assert_calls_async(0).await;
}

#[actix_rt::test]
async fn project_board_shows_projects_with_progress() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, _) = login!(app, server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/proyecto");
            then.status(200).json_body(json!([
                { "id": 1, "nombre": "Torres del Sol", "ciudad": { "nombre": "Bogotá" } },
                { "id": 2, "nombre": "Altos del Río", "ciudad": { "nombre": "Medellín" } }
            ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/estructura/porcentajeP/1");
            then.status(200).json_body(json!({ "porcentaje": 40 }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/estructura/porcentajeP/2");
            then.status(500);
        })
        .await;

    let req = test::TestRequest::get().uri("/proyectos").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Torres del Sol"));
    assert!(html.contains("Altos del Río"));
    assert!(html.contains("40%"));
    assert!(html.contains("data-href="));
    assert!(html.contains("Ana Pérez"));
}

#[actix_rt::test]
async fn board_search_filters_rows_from_query() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, _) = login!(app, server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/proyecto");
            then.status(200).json_body(json!([
                { "id": 1, "nombre": "Torres del Sol" },
                { "id": 2, "nombre": "Altos del Río" }
            ]));
        })
        .await;

    let req = test::TestRequest::get().uri("/proyectos?proyectos_search=altos").cookie(cookie).to_request();
    let html = body_text(test::call_service(&app, req).await).await;
    assert!(html.contains("Altos del Río"));
    assert!(!html.contains("Torres del Sol"));
}

#[actix_rt::test]
async fn failed_list_shows_banner_instead_of_error_page() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, _) = login!(app, server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/proyecto");
            then.status(503).json_body(json!({ "message": "Mantenimiento" }));
        })
        .await;

    let req = test::TestRequest::get().uri("/proyectos").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Mantenimiento"));
    assert!(html.contains("No hay datos disponibles"));
}

#[actix_rt::test]
async fn conjunto_page_lists_only_children_of_project() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, _) = login!(app, server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/proyecto/1");
            then.status(200).json_body(json!({ "id": 1, "nombre": "Torres del Sol" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/conjunto");
            then.status(200).json_body(json!([
                { "id": 10, "nombre": "Torre A", "id_proyecto": 1 },
                { "id": 11, "nombre": "Torre Z", "id_proyecto": 2 }
            ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/estructura/porcentajeC/10");
            then.status(200).json_body(json!({ "porcentaje": "75" }));
        })
        .await;

    let req = test::TestRequest::get().uri("/proyectos/1/conjuntos").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Conjuntos de Torres del Sol"));
    assert!(html.contains("Torre A"));
    assert!(!html.contains("Torre Z"));
    assert!(html.contains("75%"));
}

#[actix_rt::test]
async fn missing_project_is_404() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, _) = login!(app, server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/proyecto/99");
            then.status(404);
        })
        .await;

    let req = test::TestRequest::get().uri("/proyectos/99/conjuntos").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn invalid_report_is_rejected_before_backend() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, token) = login!(app, server);

    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/reporte");
            then.status(201).json_body(json!({ "id": 1 }));
        })
        .await;

    let req = post_form(
        "/actividades/5/reporte",
        cookie,
        &[("csrf_token", token.as_str()), ("descripcion", ""), ("id_resultado", "3")],
    ).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Descripción es obligatorio"));
    create.assert_calls_async(0).await;
}

#[actix_rt::test]
async fn report_submission_redirects_to_activity_list() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, token) = login!(app, server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/actividades-estructura/5");
            then.status(200).json_body(json!({ "id": 5, "id_estructura": 2 }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/reporte");
            then.status(201).json_body(json!({ "id": 70 }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/estructura/handleUpdateActividadEstructura/70");
            then.status(200);
        })
        .await;

    let req = post_form(
        "/actividades/5/reporte",
        cookie,
        &[
            ("csrf_token", token.as_str()),
            ("descripcion", "Avance parcial"),
            ("id_interventor", "11"),
            ("id_residente", "12"),
            ("id_contratista", "13"),
            ("id_resultado", "1"),
        ],
    ).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/estructuras/2/actividades");
}

#[actix_rt::test]
async fn unknown_admin_screen_is_404() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, _) = login!(app, server);

    let req = test::TestRequest::get().uri("/admin/no-existe").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn create_writes_to_unhyphenated_endpoint() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, token) = login!(app, server);

    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/tipovivienda").json_body(json!({ "nombre": "Apartamento" }));
            then.status(201).json_body(json!({ "id": 3, "nombre": "Apartamento" }));
        })
        .await;

    let req = post_form("/admin/tipo-vivienda", cookie, &[("csrf_token", token.as_str()), ("nombre", "Apartamento")]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/tipo-vivienda");
    create.assert_calls_async(1).await;
}

#[actix_rt::test]
async fn creating_structure_generates_its_activities() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, token) = login!(app, server);

    server
        .mock_async(|when, then| {
            when.method(POST).path("/estructura");
            then.status(201).json_body(json!({ "id": 31 }));
        })
        .await;
    let generate = server
        .mock_async(|when, then| {
            when.method(POST).path("/estructura/generar/31");
            then.status(200);
        })
        .await;

    let req = post_form(
        "/admin/estructura",
        cookie,
        &[
            ("csrf_token", token.as_str()),
            ("nombre", "Torre 4"),
            ("id_conjunto", "10"),
            ("id_tipo_estructura", "2"),
            ("id_estado", "1"),
        ],
    ).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    generate.assert_calls_async(1).await;
}

#[actix_rt::test]
async fn bulk_delete_removes_each_selected_row() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, token) = login!(app, server);

    let first = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/ciudad/1");
            then.status(200);
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/ciudad/2");
            then.status(200);
        })
        .await;

    let req = post_form(
        "/admin/ciudad/bulk-delete",
        cookie,
        &[("csrf_token", token.as_str()), ("ids", "1"), ("ids", "2")],
    ).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/ciudad");
    first.assert_calls_async(1).await;
    second.assert_calls_async(1).await;
}

#[actix_rt::test]
async fn logout_ends_the_session() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, token) = login!(app, server);

    let resp = test::call_service(&app, post_form("/logout", cookie, &[("csrf_token", token.as_str())]).to_request()).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[actix_rt::test]
async fn structure_page_keeps_last_rows_when_backend_fails() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, _) = login!(app, server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/conjunto/10");
            then.status(200).json_body(json!({ "id": 10, "nombre": "Torre A", "id_proyecto": 1 }));
        })
        .await;
    let healthy = server
        .mock_async(|when, then| {
            when.method(GET).path("/estructura");
            then.status(200).json_body(json!([
                { "id": 1, "nombre": "Bloque Norte", "id_conjunto": 10 },
                { "id": 2, "nombre": "Bloque Ajeno", "id_conjunto": 11 }
            ]));
        })
        .await;

    let req = test::TestRequest::get().uri("/conjuntos/10/estructuras").cookie(cookie.clone()).to_request();
    let html = body_text(test::call_service(&app, req).await).await;
    assert!(html.contains("Estructuras de Torre A"));
    assert!(html.contains("Bloque Norte"));
    assert!(!html.contains("Bloque Ajeno"));
    healthy.assert_calls_async(1).await;

    healthy.delete_async().await;
    let failing = server
        .mock_async(|when, then| {
            when.method(GET).path("/estructura");
            then.status(500).json_body(json!({ "message": "Base de datos caída" }));
        })
        .await;

    let req = test::TestRequest::get().uri("/conjuntos/10/estructuras").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Base de datos caída"));
    assert!(html.contains("Bloque Norte"), "previous rows stay on screen");
    assert!(!html.contains("No hay datos disponibles"));
    failing.assert_calls_async(1).await;
}

#[actix_rt::test]
async fn activity_page_shows_results_and_completion() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, _) = login!(app, server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/estructura/2");
            then.status(200).json_body(json!({ "id": 2, "nombre": "Bloque Norte", "id_conjunto": 10 }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/actividades-estructura");
            then.status(200).json_body(json!([
                {
                    "id": 1, "id_estructura": 2, "id_reporte": 70,
                    "actividad": { "nombre": "Excavación" },
                    "reporte": { "resultado": { "id": 3, "nombre": "Aprobado" } }
                },
                { "id": 2, "id_estructura": "2", "actividad": { "nombre": "Vaciado de placa" }, "reporte": null },
                { "id": 3, "id_estructura": 9, "actividad": { "nombre": "Cubierta" } }
            ]));
        })
        .await;

    let req = test::TestRequest::get().uri("/estructuras/2/actividades").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Actividades de Bloque Norte"));
    assert!(html.contains("Excavación"));
    assert!(html.contains("Vaciado de placa"));
    assert!(!html.contains("Cubierta"));
    assert!(html.contains("Aprobado"));
    assert!(html.contains("Sin reporte"));
    assert!(html.contains("1 de 2 actividades completadas"));
    assert!(html.contains("50%"));
    assert!(html.contains("/actividades/2/reporte"));
}

#[actix_rt::test]
async fn unreported_activities_are_searchable() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, _) = login!(app, server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/estructura/2");
            then.status(200).json_body(json!({ "id": 2, "nombre": "Bloque Norte", "id_conjunto": 10 }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/actividades-estructura");
            then.status(200).json_body(json!([
                {
                    "id": 1, "id_estructura": 2,
                    "actividad": { "nombre": "Excavación" },
                    "reporte": { "resultado": { "id": 3, "nombre": "Aprobado" } }
                },
                { "id": 2, "id_estructura": 2, "actividad": { "nombre": "Vaciado de placa" } }
            ]));
        })
        .await;

    let req = test::TestRequest::get()
        .uri("/estructuras/2/actividades?actividades_search=sin%20reporte")
        .cookie(cookie)
        .to_request();
    let html = body_text(test::call_service(&app, req).await).await;
    assert!(html.contains("Vaciado de placa"));
    assert!(!html.contains("Excavación"));
}

#[actix_rt::test]
async fn slow_backend_shows_loading_row_and_retries() {
    let server = MockServer::start_async().await;
    let api = interventoria::backend::ApiClient::new(
        &server.base_url(),
        Some(std::time::Duration::from_millis(300)),
    )
    .unwrap();
    let app = test_app!(&server, api);
    let (cookie, _) = login!(app, server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/proyecto");
            then.status(200).delay(std::time::Duration::from_secs(2)).json_body(json!([]));
        })
        .await;

    let req = test::TestRequest::get().uri("/proyectos").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Cargando..."));
    assert!(html.contains("http-equiv=\"refresh\""));
    assert!(html.contains("tardando en responder"));
    assert!(!html.contains("No hay datos disponibles"));
}

#[actix_rt::test]
async fn report_form_prefills_existing_report() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, _) = login!(app, server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/actividades-estructura/5");
            then.status(200).json_body(json!({
                "id": 5, "id_estructura": 2, "id_reporte": "40",
                "actividad": { "nombre": "Vaciado de placa" }
            }));
        })
        .await;
    let stored = server
        .mock_async(|when, then| {
            when.method(GET).path("/reporte/40");
            then.status(200).json_body(json!({
                "id": 40, "descripcion": "", "descripcion_reporte": "Placa fundida sin novedad",
                "id_interventor": 1, "id_residente": 2, "id_contratista": 3, "id_resultado": 3
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/persona");
            then.status(200).json_body(json!([{ "id": 1, "nombre": "Ana", "id_rol": 1 }]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/resultado");
            then.status(200).json_body(json!([
                { "id": 1, "nombre": "En proceso" },
                { "id": 3, "nombre": "Completo" }
            ]));
        })
        .await;

    let req = test::TestRequest::get().uri("/actividades/5/reporte").cookie(cookie).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Actualizar reporte"));
    assert!(html.contains("Vaciado de placa"));
    assert!(html.contains("Placa fundida sin novedad"));
    assert!(html.contains("<option value=\"3\" selected>Completo</option>"));
    assert!(html.contains("/estructuras/2/actividades"));
    stored.assert_calls_async(1).await;
}

#[actix_rt::test]
async fn edit_form_loads_record_from_list_endpoint() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, _) = login!(app, server);

    let list = server
        .mock_async(|when, then| {
            when.method(GET).path("/tipo-vivienda");
            then.status(200).json_body(json!([
                { "id": 3, "nombre": "Apartamento" },
                { "id": 4, "nombre": "Casa" }
            ]));
        })
        .await;

    let req = test::TestRequest::get().uri("/admin/tipo-vivienda/4/edit").cookie(cookie.clone()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Editar Tipo de vivienda"));
    assert!(html.contains("value=\"Casa\""));
    assert!(html.contains("action=\"/admin/tipo-vivienda/4\""));
    list.assert_calls_async(1).await;

    let req = test::TestRequest::get().uri("/admin/tipo-vivienda/99/edit").cookie(cookie).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn update_puts_to_write_endpoint() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, token) = login!(app, server);

    let update = server
        .mock_async(|when, then| {
            when.method(PUT).path("/tipovivienda/4").json_body(json!({ "nombre": "Casa campestre" }));
            then.status(200).json_body(json!({ "id": 4, "nombre": "Casa campestre" }));
        })
        .await;

    let req = post_form(
        "/admin/tipo-vivienda/4",
        cookie,
        &[("csrf_token", token.as_str()), ("nombre", "Casa campestre")],
    ).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/tipo-vivienda");
    update.assert_calls_async(1).await;
}

#[actix_rt::test]
async fn single_delete_hits_write_endpoint_once() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, token) = login!(app, server);

    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/tipovivienda/4");
            then.status(200);
        })
        .await;

    let req = post_form("/admin/tipo-vivienda/4/delete", cookie.clone(), &[("csrf_token", "forged")]).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = post_form("/admin/tipo-vivienda/4/delete", cookie, &[("csrf_token", token.as_str())]).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/tipo-vivienda");
    delete.assert_calls_async(1).await;
}

#[actix_rt::test]
async fn zone_assignment_crud_uses_joined_endpoints() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, token) = login!(app, server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/zona-estructura");
            then.status(200).json_body(json!([
                { "id": 8, "id_estructura": 2, "id_zona": 1,
                  "estructura": { "nombre": "Bloque Norte" }, "zona": { "nombre": "Zona verde" } }
            ]));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/zonaestructura").json_body(json!({ "id_estructura": 2, "id_zona": 5 }));
            then.status(201).json_body(json!({ "id": 9 }));
        })
        .await;

    let req = test::TestRequest::get().uri("/admin/zona-estructura").cookie(cookie.clone()).to_request();
    let html = body_text(test::call_service(&app, req).await).await;
    assert!(html.contains("Zonas por estructura"));
    assert!(html.contains("Bloque Norte"));
    assert!(html.contains("Zona verde"));

    let req = post_form(
        "/admin/zona-estructura",
        cookie,
        &[("csrf_token", token.as_str()), ("id_estructura", "2"), ("id_zona", "5")],
    ).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/zona-estructura");
    create.assert_calls_async(1).await;
}

#[actix_rt::test]
async fn bulk_delete_with_malformed_id_is_rejected() {
    let server = MockServer::start_async().await;
    let app = test_app!(&server);
    let (cookie, token) = login!(app, server);

    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/ciudad/1");
            then.status(200);
        })
        .await;

    let req = post_form(
        "/admin/ciudad/bulk-delete",
        cookie,
        &[("csrf_token", token.as_str()), ("ids", "1"), ("ids", "dos")],
    ).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(resp).await.contains("Identificador inválido: dos"));
    delete.assert_calls_async(0).await;
}
