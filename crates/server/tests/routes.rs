use std::fs;
use std::io::Cursor;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt; // oneshot

use filmotheque_core::catalog::domain::film::FilmDraft;
use filmotheque_core::catalog::domain::film_repository::FilmRepository;
use filmotheque_core::catalog::infrastructure::flat_file_repository::FlatFileRepository;
use filmotheque_core::detection::domain::face_detector::FaceDetector;
use filmotheque_core::shared::frame::Frame;
use filmotheque_core::shared::region::Region;
use filmotheque_server::config::ServerConfig;
use filmotheque_server::routes::create_router;
use filmotheque_server::state::{annotation_pipeline, AppState};

const BOUNDARY: &str = "filmothequeboundary";

struct StubDetector;

impl FaceDetector for StubDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        Ok(vec![Region::new(5, 5, 10, 10, 9.0)])
    }
}

struct TestApp {
    tmp: TempDir,
    config: ServerConfig,
    repo: Arc<FlatFileRepository>,
    router: Router,
}

impl TestApp {
    fn new(detection: bool) -> Self {
        Self::with_config(detection, |_| {})
    }

    fn with_config(detection: bool, configure: impl FnOnce(&mut ServerConfig)) -> Self {
        let tmp = TempDir::new().unwrap();
        let mut config = ServerConfig {
            catalog_file: tmp.path().join("films.txt"),
            static_dir: tmp.path().join("static"),
            ..ServerConfig::default()
        };
        configure(&mut config);
        let repo = Arc::new(FlatFileRepository::new(&config.catalog_file));
        let annotator = detection.then(|| annotation_pipeline(Box::new(StubDetector)));
        let state = AppState::new(&config, repo.clone(), annotator).unwrap();
        let router = create_router(Arc::new(state));
        Self {
            tmp,
            config,
            repo,
            router,
        }
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Option<String>, String) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, location, String::from_utf8_lossy(&body).into_owned())
    }

    async fn get(&self, uri: &str) -> (StatusCode, Option<String>, String) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post_form(&self, uri: &str, body: &str) -> (StatusCode, Option<String>, String) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn post_multipart(&self, body: Vec<u8>) -> (StatusCode, Option<String>, String) {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/film/add")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    fn image_path(&self, name: &str) -> std::path::PathBuf {
        self.config.images_dir().join(name)
    }

    fn seed(&self, title: &str, image: &str) -> u32 {
        if !image.is_empty() {
            fs::create_dir_all(self.config.images_dir()).unwrap();
            fs::write(self.image_path(image), png_bytes()).unwrap();
        }
        self.repo
            .create(FilmDraft {
                image: image.into(),
                title: title.into(),
                description: "A film".into(),
                year: 1979,
                cast: "Sigourney Weaver".into(),
                director: "Ridley Scott".into(),
            })
            .unwrap()
            .id
    }
}

fn png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    image::RgbImage::from_pixel(40, 30, image::Rgb([10, 20, 30]))
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn multipart_body(fields: &[(&str, &str)], image: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

const ADD_FIELDS: &[(&str, &str)] = &[
    ("title", "Alien"),
    ("description", "In space no one can hear you scream."),
    ("year", "1979"),
    ("cast", "Sigourney Weaver"),
    ("director", "Ridley Scott"),
];

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(false);
    let (status, _, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}

#[tokio::test]
async fn test_home_lists_films() {
    let app = TestApp::new(false);
    let (_, _, empty) = app.get("/").await;
    assert!(empty.contains("The catalog is empty."));

    app.seed("Alien", "");
    app.seed("Heat", "");
    let (status, _, body) = app.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<a href=\"/film/1\">Alien</a>"));
    assert!(body.contains("<a href=\"/film/2\">Heat</a>"));
}

#[tokio::test]
async fn test_add_form_is_served() {
    let app = TestApp::new(false);
    let (status, _, body) = app.get("/film/add").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("enctype=\"multipart/form-data\""));
}

#[tokio::test]
async fn test_create_with_image_redirects_to_detail() {
    let app = TestApp::new(false);
    let png = png_bytes();

    let (status, location, _) = app
        .post_multipart(multipart_body(ADD_FIELDS, Some(("alien poster.png", &png))))
        .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/film/1"));
    let film = app.repo.get(1).unwrap().unwrap();
    assert_eq!(film.title, "Alien");
    assert_eq!(film.year, 1979);
    assert_eq!(film.image, "alien_poster.png");
    assert_eq!(fs::read(app.image_path("alien_poster.png")).unwrap(), png);
}

#[tokio::test]
async fn test_create_without_file_stores_empty_image() {
    let app = TestApp::new(false);
    let (status, location, _) = app
        .post_multipart(multipart_body(ADD_FIELDS, Some(("", b""))))
        .await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/film/1"));
    assert_eq!(app.repo.get(1).unwrap().unwrap().image, "");
}

#[tokio::test]
async fn test_upload_over_limit_is_413() {
    let app = TestApp::with_config(false, |config| config.max_upload_bytes = 1024);
    let oversized = vec![0u8; 4096];

    let (status, _, body) = app
        .post_multipart(multipart_body(ADD_FIELDS, Some(("big.png", &oversized))))
        .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body.contains("413"));
    assert!(app.repo.list().unwrap().is_empty());
    assert!(!app.image_path("big.png").exists());
}

#[tokio::test]
async fn test_upload_named_like_annotated_copy_is_rejected() {
    let app = TestApp::new(true);
    let id = app.seed("Alien", "poster.png");
    let png = png_bytes();

    let (status, _, _) = app
        .post_multipart(multipart_body(ADD_FIELDS, Some(("faces_poster.png", &png))))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.repo.list().unwrap().len(), 1);
    assert!(!app.image_path("faces_poster.png").exists());

    let (status, _, _) = app
        .post_form(
            &format!("/film/edit/{id}"),
            "image=faces_poster.png&title=Alien&year=1979",
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.repo.get(id).unwrap().unwrap().image, "poster.png");
}

#[tokio::test]
async fn test_create_with_bad_year_is_rejected() {
    let app = TestApp::new(false);
    let fields = [("title", "Alien"), ("year", "late seventies")];
    let (status, _, body) = app.post_multipart(multipart_body(&fields, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("year must be an integer"));
    assert!(app.repo.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_with_delimiter_in_title_is_rejected() {
    let app = TestApp::new(false);
    let fields = [("title", "Alien; Aliens"), ("year", "1979")];
    let (status, _, _) = app.post_multipart(multipart_body(&fields, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.repo.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_detail_annotates_faces() {
    let app = TestApp::new(true);
    let id = app.seed("Alien", "poster.png");

    let (status, _, body) = app.get(&format!("/film/{id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/static/images/faces_poster.png"));
    assert!(body.contains("1 face(s) detected."));
    let annotated = image::open(app.image_path("faces_poster.png"))
        .unwrap()
        .to_rgb8();
    assert_eq!(annotated.get_pixel(5, 5).0, [255, 0, 0]);
    assert_eq!(annotated.get_pixel(30, 25).0, [10, 20, 30]);
}

#[tokio::test]
async fn test_detail_without_detection_shows_original() {
    let app = TestApp::new(false);
    let id = app.seed("Alien", "poster.png");

    let (status, _, body) = app.get(&format!("/film/{id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/static/images/poster.png"));
    assert!(!app.image_path("faces_poster.png").exists());
}

#[tokio::test]
async fn test_detail_with_missing_image_still_renders() {
    let app = TestApp::new(true);
    let id = app.seed("Alien", "");
    app.repo
        .update(
            id,
            FilmDraft {
                image: "vanished.png".into(),
                title: "Alien".into(),
                year: 1979,
                ..FilmDraft::default()
            },
        )
        .unwrap();

    let (status, _, body) = app.get(&format!("/film/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("face(s) detected"));
}

#[tokio::test]
async fn test_unknown_film_is_404() {
    let app = TestApp::new(true);
    let (status, _, body) = app.get("/film/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("Film 42 not found"));

    let (status, _, _) = app.get("/film/edit/42").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_film_id_is_404_page() {
    let app = TestApp::new(true);
    app.seed("Alien", "");

    for uri in ["/film/abc", "/film/edit/xyz", "/film/-1"] {
        let (status, _, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert!(body.contains("<html"), "{uri}");
        assert!(body.contains("not found"), "{uri}");
    }

    let (status, _, _) = app
        .post_form("/film/edit/abc", "title=Ghost&year=1990")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = app.post_form("/film/delete/abc", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.repo.list().unwrap().len(), 1);
}

#[tokio::test]
async fn test_edit_form_is_prefilled() {
    let app = TestApp::new(false);
    let id = app.seed("Alien", "poster.png");
    let (status, _, body) = app.get(&format!("/film/edit/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("value=\"Alien\""));
    assert!(body.contains("value=\"poster.png\""));
    assert!(body.contains("value=\"1979\""));
}

#[tokio::test]
async fn test_edit_updates_and_redirects() {
    let app = TestApp::new(false);
    let id = app.seed("Alien", "poster.png");

    let (status, location, _) = app
        .post_form(
            &format!("/film/edit/{id}"),
            "image=poster.png&title=Aliens&description=Sequel&year=1986&cast=Sigourney+Weaver&director=James+Cameron",
        )
        .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location, Some(format!("/film/{id}")));
    let film = app.repo.get(id).unwrap().unwrap();
    assert_eq!(film.title, "Aliens");
    assert_eq!(film.year, 1986);
    assert_eq!(film.director, "James Cameron");
}

#[tokio::test]
async fn test_edit_with_bad_year_is_400() {
    let app = TestApp::new(false);
    let id = app.seed("Alien", "");
    let (status, _, _) = app
        .post_form(&format!("/film/edit/{id}"), "title=Alien&year=abc")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.repo.get(id).unwrap().unwrap().year, 1979);
}

#[tokio::test]
async fn test_edit_unknown_film_is_404() {
    let app = TestApp::new(false);
    let (status, _, _) = app
        .post_form("/film/edit/7", "title=Ghost&year=1990")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.repo.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_removes_film_and_images() {
    let app = TestApp::new(true);
    let id = app.seed("Alien", "poster.png");
    app.get(&format!("/film/{id}")).await;
    assert!(app.image_path("faces_poster.png").exists());

    let (status, location, _) = app
        .post_form(&format!("/film/delete/{id}"), "")
        .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/"));
    assert!(app.repo.list().unwrap().is_empty());
    assert!(!app.image_path("poster.png").exists());
    assert!(!app.image_path("faces_poster.png").exists());
}

#[tokio::test]
async fn test_delete_unknown_film_redirects_home() {
    let app = TestApp::new(false);
    let (status, location, _) = app.post_form("/film/delete/3", "").await;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_static_images_are_served() {
    let app = TestApp::new(false);
    app.seed("Alien", "poster.png");
    let resp = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/static/images/poster.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "image/png");
    assert!(app.tmp.path().join("static/images/poster.png").exists());
}
