//! Dataset descriptors and the CSV source loader.
//!
//! The four resources are published as semicolon-delimited UTF-8 CSV with
//! a fixed header row. The loader preserves column order and names and
//! keeps every cell a string. Typing happens in the cleaning step, never
//! as an implicit coercion at parse time.

use csv::ReaderBuilder;
use tracing::debug;

use crate::aggregate::CategorySet;
use crate::error::{Error, Result};
use crate::fetch::{self, BasicClient, HttpClient};
use crate::table::{Table, Value};

/// Default base for the authority's open-data resources. Overridable via
/// the `CENIPA_BASE_URL` environment variable or the `--base` flag, which
/// also accept a local directory of previously downloaded files.
pub const DEFAULT_BASE_URL: &str = "http://sistema.cenipa.aer.mil.br/cenipa/media/opendata";

// occurrence columns
pub const COL_OCCURRENCE_DAY: &str = "ocorrencia_dia";
pub const COL_OCCURRENCE_TIME: &str = "ocorrencia_hora";
/// Derived by the cleaner from day + hour; not present in the raw file.
pub const COL_OCCURRENCE_DATE: &str = "ocorrencia_data";
pub const COL_LATITUDE: &str = "ocorrencia_latitude";
pub const COL_LONGITUDE: &str = "ocorrencia_longitude";
pub const COL_CLASSIFICATION: &str = "ocorrencia_classificacao";
pub const COL_CITY: &str = "ocorrencia_cidade";
pub const COL_INVESTIGATION_STATUS: &str = "investigacao_status";
pub const COL_TOTAL_AIRCRAFT: &str = "total_aeronaves_envolvidas";

// occurrence-type columns
pub const COL_TYPE: &str = "ocorrencia_tipo";
pub const COL_TYPE_CATEGORY: &str = "ocorrencia_tipo_categoria";

// aircraft columns
pub const COL_VEHICLE_TYPE: &str = "aeronave_tipo_veiculo";
pub const COL_OPERATOR_CATEGORY: &str = "aeronave_operador_categoria";
pub const COL_MANUFACTURER: &str = "aeronave_fabricante";
pub const COL_MODEL: &str = "aeronave_modelo";
pub const COL_ENGINE_COUNT: &str = "aeronave_motor_quantidade";
pub const COL_SEATS: &str = "aeronave_assentos";
pub const COL_FABRICATION_YEAR: &str = "aeronave_ano_fabricacao";
pub const COL_ORIGIN: &str = "aeronave_voo_origem";
pub const COL_DESTINATION: &str = "aeronave_voo_destino";
pub const COL_OPERATION_PHASE: &str = "aeronave_fase_operacao";
pub const COL_OPERATION_TYPE: &str = "aeronave_tipo_operacao";
pub const COL_DAMAGE_LEVEL: &str = "aeronave_nivel_dano";
pub const COL_FATALITIES: &str = "aeronave_fatalidades_total";

// contributing-factor columns
pub const COL_FACTOR_AREA: &str = "fator_area";
pub const COL_FACTOR_CONDITIONING: &str = "fator_condicionante";
pub const COL_FACTOR_NAME: &str = "fator_nome";

// categorical vocabulary
pub const CLASS_ACCIDENT: &str = "ACIDENTE";
pub const DAMAGE_NONE: &str = "NENHUM";
pub const DAMAGE_LIGHT: &str = "LEVE";
pub const DAMAGE_SUBSTANTIAL: &str = "SUBSTANCIAL";
pub const DAMAGE_DESTROYED: &str = "DESTRUÍDA";
pub const AREA_OPERATIONAL: &str = "FATOR OPERACIONAL";
pub const AREA_HUMAN: &str = "FATOR HUMANO";
pub const CONDITIONING_AIRCRAFT_OPERATION: &str = "OPERAÇÃO DA AERONAVE";
pub const CONDITIONING_INDIVIDUAL: &str = "INDIVIDUAL";
pub const CONDITIONING_ORGANISATIONAL: &str = "ORGANIZACIONAL";

/// Label of the bucket that collects categorical values outside a closed
/// set. Parenthesized lowercase so it can never collide with the
/// authority's uppercase vocabulary.
pub const UNKNOWN_LABEL: &str = "(desconhecido)";

/// Damage severity in ascending order. Values the authority adds or
/// redacts (it uses `***` for undisclosed cells) fold into the unknown
/// bucket instead of disappearing from the totals.
pub const DAMAGE_LEVELS: CategorySet = CategorySet {
    expected: &[DAMAGE_NONE, DAMAGE_LIGHT, DAMAGE_SUBSTANTIAL, DAMAGE_DESTROYED],
    other_label: UNKNOWN_LABEL,
};

/// One of the four published resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dataset {
    pub name: &'static str,
    pub resource: &'static str,
    pub delimiter: u8,
}

pub const OCCURRENCE: Dataset = Dataset {
    name: "occurrence",
    resource: "ocorrencia.csv",
    delimiter: b';',
};

pub const OCCURRENCE_TYPE: Dataset = Dataset {
    name: "occurrence_type",
    resource: "ocorrencia_tipo.csv",
    delimiter: b';',
};

pub const AIRCRAFT: Dataset = Dataset {
    name: "aircraft",
    resource: "aeronave.csv",
    delimiter: b';',
};

pub const CONTRIBUTING_FACTOR: Dataset = Dataset {
    name: "contributing_factor",
    resource: "fator_contribuinte.csv",
    delimiter: b';',
};

pub const ALL_DATASETS: [Dataset; 4] = [OCCURRENCE, OCCURRENCE_TYPE, AIRCRAFT, CONTRIBUTING_FACTOR];

impl Dataset {
    /// Resolves the resource location under a base URL or directory.
    pub fn location(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.resource)
    }
}

/// Retrieves a dataset's raw bytes: over HTTP when the base is a URL,
/// from the filesystem otherwise.
#[tracing::instrument(skip(client, base), fields(dataset = dataset.name))]
pub async fn read_source<C: HttpClient>(
    client: &C,
    base: &str,
    dataset: &Dataset,
) -> Result<Vec<u8>> {
    let location = dataset.location(base);
    let fetched = if base.starts_with("http") {
        fetch::fetch_bytes(client, &location).await
    } else {
        std::fs::read(&location).map_err(anyhow::Error::from)
    };
    fetched.map_err(|e| Error::SourceUnavailable {
        name: dataset.name.to_string(),
        reason: e.to_string(),
    })
}

/// Parses raw bytes as the dataset's delimited table. Every cell comes
/// out as `Value::Text`, empty fields included.
pub fn parse_table(dataset: &Dataset, bytes: &[u8]) -> Result<Table> {
    let malformed = |reason: String| Error::MalformedSource {
        name: dataset.name.to_string(),
        reason,
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(dataset.delimiter)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| malformed(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();
    if columns.is_empty() {
        return Err(malformed("no header row".to_string()));
    }

    let mut table = Table::new(dataset.name, columns);
    for record in reader.records() {
        // ragged rows and invalid UTF-8 surface here
        let record = record.map_err(|e| malformed(e.to_string()))?;
        table.push_row(record.iter().map(|f| Value::Text(f.to_string())).collect());
    }

    debug!(
        dataset = dataset.name,
        rows = table.len(),
        columns = table.columns().len(),
        "Dataset parsed"
    );
    Ok(table)
}

/// Fetches and parses one dataset.
pub async fn load_dataset<C: HttpClient>(
    client: &C,
    base: &str,
    dataset: &Dataset,
) -> Result<Table> {
    let bytes = read_source(client, base, dataset).await?;
    parse_table(dataset, &bytes)
}

/// The four raw tables of one analysis snapshot.
#[derive(Debug)]
pub struct Tables {
    pub occurrences: Table,
    pub occurrence_types: Table,
    pub aircraft: Table,
    pub factors: Table,
}

/// Loads the four datasets concurrently. Returns only when all four are
/// complete; any failure is terminal for the whole load.
pub async fn load_all(base: &str) -> Result<Tables> {
    let spawn = |dataset: Dataset| {
        let base = base.to_string();
        tokio::spawn(async move {
            let client = BasicClient::new();
            load_dataset(&client, &base, &dataset).await
        })
    };
    let occurrences = spawn(OCCURRENCE);
    let occurrence_types = spawn(OCCURRENCE_TYPE);
    let aircraft = spawn(AIRCRAFT);
    let factors = spawn(CONTRIBUTING_FACTOR);

    Ok(Tables {
        occurrences: occurrences.await.map_err(|e| join_failure(OCCURRENCE.name, e))??,
        occurrence_types: occurrence_types
            .await
            .map_err(|e| join_failure(OCCURRENCE_TYPE.name, e))??,
        aircraft: aircraft.await.map_err(|e| join_failure(AIRCRAFT.name, e))??,
        factors: factors.await.map_err(|e| join_failure(CONTRIBUTING_FACTOR.name, e))??,
    })
}

fn join_failure(name: &str, e: tokio::task::JoinError) -> Error {
    Error::SourceUnavailable {
        name: name.to_string(),
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_table_keeps_cells_as_text() {
        let bytes = b"a;b;c\n1;x;\n2;y;3,5\n";
        let t = parse_table(&OCCURRENCE, bytes).unwrap();
        assert_eq!(t.columns(), &["a", "b", "c"]);
        assert_eq!(t.len(), 2);
        let cells: Vec<&Value> = t.cells("a").unwrap().collect();
        assert_eq!(cells[0], &Value::Text("1".to_string()));
        // empty field stays an empty string, not a sentinel
        let cells: Vec<&Value> = t.cells("c").unwrap().collect();
        assert_eq!(cells[0], &Value::Text(String::new()));
    }

    #[test]
    fn test_parse_table_ragged_row_is_malformed() {
        let bytes = b"a;b\n1;2\n3\n";
        let err = parse_table(&OCCURRENCE, bytes).err().unwrap();
        assert!(matches!(err, Error::MalformedSource { name, .. } if name == "occurrence"));
    }

    #[test]
    fn test_parse_table_empty_input_is_malformed() {
        let err = parse_table(&AIRCRAFT, b"").err().unwrap();
        assert!(matches!(err, Error::MalformedSource { .. }));
    }

    #[test]
    fn test_location_joins_base_and_resource() {
        assert_eq!(
            OCCURRENCE.location("http://example.org/opendata/"),
            "http://example.org/opendata/ocorrencia.csv"
        );
        assert_eq!(OCCURRENCE.location("/tmp/data"), "/tmp/data/ocorrencia.csv");
    }

    #[tokio::test]
    async fn test_load_dataset_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(OCCURRENCE_TYPE.resource);
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "codigo_ocorrencia1;ocorrencia_tipo").unwrap();
        writeln!(f, "100;FALHA DO MOTOR EM VOO").unwrap();

        let client = BasicClient::new();
        let t = load_dataset(&client, dir.path().to_str().unwrap(), &OCCURRENCE_TYPE)
            .await
            .unwrap();
        assert_eq!(t.len(), 1);
    }

    #[tokio::test]
    async fn test_load_dataset_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let client = BasicClient::new();
        let err = load_dataset(&client, dir.path().to_str().unwrap(), &AIRCRAFT)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::SourceUnavailable { name, .. } if name == "aircraft"));
    }
}
