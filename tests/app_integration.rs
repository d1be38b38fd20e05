use startdash::AppCommand;
use startdash::cli::data::ExportTarget;
use startdash::core::filter::{FilterState, SortDirection, SortField, SortState};
use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const STARTUPS_JSON: &str = r#"[
        {
            "id": 1,
            "nome": "Foo",
            "setor": "Fintech",
            "localizacao": "Brasil",
            "ano_fundacao": 2015,
            "valor_investimento": "R$10M",
            "vc_investidor": "Kaszek, Monashees",
            "rodada": "Série A",
            "site": "https://foo.io"
        },
        {
            "id": 2,
            "nome": "Bar",
            "setor": "Health",
            "localizacao": "Chile",
            "ano_fundacao": 2018,
            "valor_investimento": "US$2M",
            "vc_investidor": "Monashees",
            "rodada": "Seed",
            "site": "https://bar.cl"
        },
        {
            "id": 3,
            "nome": null,
            "valor_investimento": "não divulgado"
        }
    ]"#;

    pub async fn create_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/startups"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(dir: &std::path::Path, base_url: &str, extra: &str) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        let config_content = format!(
            r#"
api:
  base_url: "{base_url}/api"
currency:
  usd_rate: 5.0
{extra}
"#
        );
        std::fs::write(&config_path, config_content).expect("Failed to write config file");
        config_path
    }
}

#[test_log::test(tokio::test)]
async fn test_all_pages_render_with_mock() {
    let mock_server = test_utils::create_mock_server(200, test_utils::STARTUPS_JSON).await;
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "");
    let config_path = config_path.to_str().unwrap();

    let commands = vec![
        AppCommand::Dashboard,
        AppCommand::Startups {
            filters: FilterState {
                search_term: "foo".to_string(),
                ..Default::default()
            },
        },
        AppCommand::Data {
            filters: FilterState::default(),
            sort: SortState::default(),
            export: None,
        },
        AppCommand::Investors {
            search: String::new(),
        },
    ];

    for command in commands {
        info!(?command, "Running page");
        let result = startdash::run_command(command, Some(config_path)).await;
        assert!(result.is_ok(), "Page failed with: {:?}", result.err());
    }
}

#[test_log::test(tokio::test)]
async fn test_data_export_writes_filtered_sorted_csv() {
    let mock_server = test_utils::create_mock_server(200, test_utils::STARTUPS_JSON).await;
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "");
    let export_path = temp_dir.path().join("startups-data.csv");

    let result = startdash::run_command(
        AppCommand::Data {
            filters: FilterState {
                investor: Some("Monashees".to_string()),
                ..Default::default()
            },
            sort: SortState {
                field: SortField::FoundedYear,
                direction: SortDirection::Descending,
            },
            export: Some(ExportTarget::Path(export_path.clone())),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Export failed with: {:?}", result.err());

    let csv = fs::read_to_string(&export_path).expect("Export file missing");
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Nome,Setor,País"));
    assert_eq!(
        lines[1],
        "Bar,Health,Chile,Chile,2018,US$2M,US$2M,Monashees,Seed,https://bar.cl,Ativa"
    );
}

#[test_log::test(tokio::test)]
async fn test_quoted_export_from_config() {
    let mock_server = test_utils::create_mock_server(200, test_utils::STARTUPS_JSON).await;
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let export_path = temp_dir.path().join("quoted.csv");
    let extra = format!(
        "export:\n  filename: \"{}\"\n  quote_fields: true\n",
        export_path.display()
    );
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), &extra);

    let result = startdash::run_command(
        AppCommand::Data {
            filters: FilterState {
                search_term: "kaszek".to_string(),
                ..Default::default()
            },
            sort: SortState::default(),
            export: Some(ExportTarget::Configured),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Export failed with: {:?}", result.err());

    let csv = fs::read_to_string(&export_path).expect("Export file missing");
    assert!(csv.contains("\"Kaszek, Monashees\""));
}

#[test_log::test(tokio::test)]
async fn test_failed_load_is_reported_as_error() {
    let mock_server = test_utils::create_mock_server(500, "boom").await;
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(temp_dir.path(), &mock_server.uri(), "");

    let result = startdash::run_command(
        AppCommand::Investors {
            search: String::new(),
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("Load should fail on HTTP 500");
    assert!(err.to_string().contains("Failed to load startups"));
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_is_an_error() {
    let result =
        startdash::run_command(AppCommand::Dashboard, Some("/no/such/startdash.yaml")).await;
    assert!(result.is_err());
}
