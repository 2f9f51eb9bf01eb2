//! Python bindings for the coast-search Rust library.
//!
//! Exposes segment generation, query planning, credential merging, result
//! flattening and URL deduplication. Documents cross the boundary as plain
//! Python dicts and lists.

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use coast_search::binding::{merge, BoundSegment, Credential};
use coast_search::config::START_DATE_FORMAT;
use coast_search::dimensions::{validate_dimensions, Dimension};
use coast_search::results::{deduplicate_value, flatten_value};
use coast_search::segments::{
    generate, DimensionClauses, QueryPlanner, Segment, VocabularyWordSource, DEFAULT_VOCABULARY,
};
use coast_search::validation;
use coast_search::CoastError;

/// Python wrapper for Segment.
#[pyclass(name = "Segment")]
#[derive(Clone)]
pub struct PySegment {
    inner: Segment,
}

#[pymethods]
impl PySegment {
    /// Creates a segment.
    #[new]
    fn new(segment_id: u32, logic: String, query: String) -> Self {
        Self {
            inner: Segment::new(segment_id, logic, query),
        }
    }

    /// Returns the segment id.
    #[getter]
    fn segment_id(&self) -> u32 {
        self.inner.segment_id
    }

    /// Returns the logic label.
    #[getter]
    fn logic(&self) -> &str {
        &self.inner.logic
    }

    /// Returns the query string.
    #[getter]
    fn query(&self) -> &str {
        &self.inner.query
    }

    /// Returns true for the random and seed baselines.
    fn is_baseline(&self) -> bool {
        self.inner.is_baseline()
    }

    /// Converts to a dictionary.
    fn to_dict(&self, py: Python<'_>) -> PyResult<PyObject> {
        to_py(py, &self.inner)
    }

    fn __repr__(&self) -> String {
        format!(
            "Segment(segment_id={}, logic='{}')",
            self.inner.segment_id, self.inner.logic
        )
    }
}

/// Generates every segment for the given `(name, words)` dimensions.
///
/// Raises `ValueError` for an empty dimension set, a dimension without words,
/// repeated dimension names or repeated words within a dimension.
#[pyfunction]
fn generate_segments(
    dimensions: Vec<(String, Vec<String>)>,
    seed: &str,
    random_phrase: &str,
) -> PyResult<Vec<PySegment>> {
    let dimensions = to_dimensions(dimensions);
    validate_dimensions(&dimensions).map_err(|e| to_py_err(e.into()))?;

    let clauses: Vec<DimensionClauses> = dimensions
        .iter()
        .map(DimensionClauses::from_dimension)
        .collect();
    let segments = generate(&clauses, seed, random_phrase).map_err(to_py_err)?;
    Ok(segments.into_iter().map(|inner| PySegment { inner }).collect())
}

/// Plans a day's queries, drawing the random phrase from `vocabulary`.
///
/// Returns the plan as a dict with `seed`, `random_phrase`, `total_words`,
/// `segments` and `fingerprint`.
#[pyfunction]
#[pyo3(signature = (dimensions, seed="software", key_max=32, vocabulary=None, rng_seed=None))]
fn plan_queries(
    py: Python<'_>,
    dimensions: Vec<(String, Vec<String>)>,
    seed: &str,
    key_max: usize,
    vocabulary: Option<Vec<String>>,
    rng_seed: Option<u64>,
) -> PyResult<PyObject> {
    let vocabulary =
        vocabulary.unwrap_or_else(|| DEFAULT_VOCABULARY.iter().map(|w| (*w).to_string()).collect());
    let mut words = match rng_seed {
        Some(rng_seed) => VocabularyWordSource::with_seed(vocabulary, rng_seed),
        None => VocabularyWordSource::new(vocabulary),
    };

    let plan = QueryPlanner::new()
        .with_seed(seed)
        .with_max_words(key_max)
        .plan(&to_dimensions(dimensions), &mut words)
        .map_err(to_py_err)?;

    let mut value = serde_json::to_value(&plan).map_err(|e| to_py_err(e.into()))?;
    value["fingerprint"] = serde_json::json!(plan.fingerprint());
    json_to_py(py, &value)
}

/// Counts the words of a configuration, raising if it exceeds `max_words`.
#[pyfunction]
#[pyo3(signature = (seed, random_phrase, word_lists, max_words=32))]
fn validate_query_length(
    seed: &str,
    random_phrase: &str,
    word_lists: Vec<Vec<String>>,
    max_words: usize,
) -> PyResult<usize> {
    validation::validate_query_length(seed, random_phrase, &word_lists, max_words)
        .map_err(|e| to_py_err(e.into()))
}

/// Attaches credentials to segments.
///
/// `segments` are dicts with `segment_id`, `logic` and `query`;
/// `search_engines` are dicts with `name`, `api_key` and `search_engine_id`.
#[pyfunction]
fn merge_segments(
    py: Python<'_>,
    segments: &Bound<'_, PyList>,
    search_engines: &Bound<'_, PyList>,
) -> PyResult<PyObject> {
    let segments: Vec<Segment> = from_py(segments.as_any())?;
    let credentials: Vec<Credential> = from_py(search_engines.as_any())?;
    let bound: Vec<BoundSegment> = merge(segments, &credentials).map_err(to_py_err)?;
    to_py(py, &bound)
}

/// Flattens a `{"results": [[item, ...], ...]}` collection into one dict per hit.
#[pyfunction]
fn flatten_results(py: Python<'_>, collection: &Bound<'_, PyDict>) -> PyResult<PyObject> {
    let records = flatten_value(py_to_json(collection.as_any())?).map_err(to_py_err)?;
    to_py(py, &records)
}

/// Deduplicates the links of a `{"results": [[item, ...], ...]}` collection.
#[pyfunction]
fn deduplicate_urls(py: Python<'_>, collection: &Bound<'_, PyDict>) -> PyResult<PyObject> {
    let report = deduplicate_value(py_to_json(collection.as_any())?).map_err(to_py_err)?;
    to_py(py, &report)
}

/// Day of the study `today` falls on; both dates are `DD-MM-YYYY`.
#[pyfunction]
fn day_number(start_date: &str, today: &str) -> PyResult<i64> {
    let start = parse_date(start_date)?;
    let today = parse_date(today)?;
    Ok((today - start).num_days() + 1)
}

// Helper functions

fn to_dimensions(dimensions: Vec<(String, Vec<String>)>) -> Vec<Dimension> {
    dimensions
        .into_iter()
        .map(|(name, words)| Dimension::new(name, words))
        .collect()
}

fn parse_date(date: &str) -> PyResult<NaiveDate> {
    NaiveDate::parse_from_str(date, START_DATE_FORMAT)
        .map_err(|e| PyValueError::new_err(format!("invalid date '{date}': {e}")))
}

fn to_py_err(error: CoastError) -> PyErr {
    PyValueError::new_err(error.to_string())
}

fn to_py<T: serde::Serialize>(py: Python<'_>, value: &T) -> PyResult<PyObject> {
    let json = serde_json::to_value(value).map_err(|e| to_py_err(e.into()))?;
    json_to_py(py, &json)
}

fn from_py<T: serde::de::DeserializeOwned>(obj: &Bound<'_, PyAny>) -> PyResult<T> {
    serde_json::from_value(py_to_json(obj)?).map_err(|e| PyValueError::new_err(e.to_string()))
}

fn py_to_json(obj: &Bound<'_, PyAny>) -> PyResult<serde_json::Value> {
    if obj.is_none() {
        return Ok(serde_json::Value::Null);
    }

    if let Ok(b) = obj.extract::<bool>() {
        return Ok(serde_json::Value::Bool(b));
    }

    if let Ok(i) = obj.extract::<i64>() {
        return Ok(serde_json::Value::Number(i.into()));
    }

    if let Ok(f) = obj.extract::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Ok(serde_json::Value::Number(n));
        }
    }

    if let Ok(s) = obj.extract::<String>() {
        return Ok(serde_json::Value::String(s));
    }

    if let Ok(list) = obj.downcast::<PyList>() {
        let mut arr = Vec::new();
        for item in list.iter() {
            arr.push(py_to_json(&item)?);
        }
        return Ok(serde_json::Value::Array(arr));
    }

    if let Ok(dict) = obj.downcast::<PyDict>() {
        let mut map = serde_json::Map::new();
        for (key, value) in dict.iter() {
            let key_str: String = key.extract()?;
            map.insert(key_str, py_to_json(&value)?);
        }
        return Ok(serde_json::Value::Object(map));
    }

    Err(PyValueError::new_err(format!(
        "unsupported value of type {}",
        obj.get_type().name()?
    )))
}

fn json_to_py(py: Python<'_>, value: &serde_json::Value) -> PyResult<PyObject> {
    Ok(match value {
        serde_json::Value::Null => py.None(),
        serde_json::Value::Bool(b) => b.into_py(py),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into_py(py)
            } else if let Some(f) = n.as_f64() {
                f.into_py(py)
            } else {
                py.None()
            }
        }
        serde_json::Value::String(s) => s.into_py(py),
        serde_json::Value::Array(arr) => {
            let items = arr
                .iter()
                .map(|v| json_to_py(py, v))
                .collect::<PyResult<Vec<_>>>()?;
            PyList::new_bound(py, items).into_py(py)
        }
        serde_json::Value::Object(map) => {
            let dict = PyDict::new_bound(py);
            for (k, v) in map {
                dict.set_item(k, json_to_py(py, v)?)?;
            }
            dict.into_py(py)
        }
    })
}

/// The coast_search Python module.
#[pymodule]
fn coast_search_py(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySegment>()?;
    m.add_function(wrap_pyfunction!(generate_segments, m)?)?;
    m.add_function(wrap_pyfunction!(plan_queries, m)?)?;
    m.add_function(wrap_pyfunction!(validate_query_length, m)?)?;
    m.add_function(wrap_pyfunction!(merge_segments, m)?)?;
    m.add_function(wrap_pyfunction!(flatten_results, m)?)?;
    m.add_function(wrap_pyfunction!(deduplicate_urls, m)?)?;
    m.add_function(wrap_pyfunction!(day_number, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
