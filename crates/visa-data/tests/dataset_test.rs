//! Integration tests over a mirrored dataset tree.
//!
//! Builds a small `data/` tree on disk and walks the same path the portal
//! does: index, search, detail, history.

use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use visa_core::{Codigo, Ndoc};
use visa_data::{
    search, DetailLoader, DirSource, Fetcher, HistoryLoader, IndexStore, SearchOptions,
    SearchOutcome,
};

fn write(root: &Path, relative: &str, body: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
    std::fs::write(path, body).expect("write file");
}

fn mirror() -> TempDir {
    let tmp = TempDir::new().expect("create temp dir");
    write(
        tmp.path(),
        "data/index_regulados.json",
        r#"{
            "meta": { "total": 3 },
            "dados": [
                { "codigo": 1234, "razao": "Farmácia Central", "fantasia": "Farma", "documento": "12345678900" },
                { "codigo": 7, "razao": "Padaria São Jorge", "fantasia": null, "documento": null },
                { "codigo": 45678, "razao": "Clínica Vida", "fantasia": "Vida", "documento": "98.765.432/0001-10" }
            ]
        }"#,
    );
    write(
        tmp.path(),
        "data/reg/01/01234.json",
        r#"{
            "codigo": 1234,
            "razao": "Farmácia Central",
            "fantasia": "Farma",
            "endereco": { "logradouro": "Av. Brasil, 10" },
            "bairro": { "nome": "Centro" },
            "alvara_ultimo": { "exercicio": 2025, "dt_validade": "2025-12-31" },
            "atividades": [{ "subclasse": "4771-7/01", "atividade": "Farmácia", "tipo": "P" }],
            "inspecoes": [{ "dt_visita": "2025-03-10", "tipo": "Termo", "numer": 1, "pz_retorno": 30, "ndoc": 12345 }]
        }"#,
    );
    write(tmp.path(), "data/reg/00/7.json", r#"{ "codigo": 7, "razao": "Padaria São Jorge" }"#);
    write(tmp.path(), "data/his/45/12345.json", r#"{ "decr": "Retorno agendado." }"#);
    tmp
}

#[tokio::test]
async fn test_lookup_flow() {
    let tmp = mirror();
    let fetcher = Fetcher::new(Arc::new(DirSource::new(tmp.path())));

    let index = IndexStore::load(&fetcher).await.expect("load index");
    assert_eq!(index.len(), 3);

    let outcome = search("farma", &index, &SearchOptions::default());
    let codes: Vec<u32> = outcome.entries().iter().map(|e| e.codigo.get()).collect();
    assert_eq!(codes, vec![1234]);

    let detail = DetailLoader::new(fetcher.clone())
        .load(Codigo::new(1234).expect("valid codigo"), Some(&index))
        .await
        .expect("load detail");
    assert_eq!(detail.documento.as_deref(), Some("12345678900"));
    let ndoc = detail.inspecoes[0].ndoc.expect("inspection has memo");

    let history = HistoryLoader::new(fetcher)
        .load(ndoc)
        .await
        .expect("load history");
    assert_eq!(history.memo.as_deref(), Some("Retorno agendado."));
}

#[tokio::test]
async fn test_accent_free_query_finds_accented_name() {
    let tmp = mirror();
    let fetcher = Fetcher::new(Arc::new(DirSource::new(tmp.path())));
    let index = IndexStore::load(&fetcher).await.expect("load index");

    let outcome = search("sao jorge", &index, &SearchOptions::default());
    assert_eq!(outcome.entries().len(), 1);
    assert_eq!(outcome.entries()[0].codigo.get(), 7);

    assert_eq!(
        search("v", &index, &SearchOptions::default()),
        SearchOutcome::TooShort { min_chars: 2 }
    );
}

#[tokio::test]
async fn test_legacy_detail_and_missing_history() {
    let tmp = mirror();
    let fetcher = Fetcher::new(Arc::new(DirSource::new(tmp.path())));

    let detail = DetailLoader::new(fetcher.clone())
        .load(Codigo::new(7).expect("valid codigo"), None)
        .await
        .expect("legacy detail");
    assert_eq!(detail.razao.as_deref(), Some("Padaria São Jorge"));
    assert!(detail.alvara_ultimo.is_none());

    let err = HistoryLoader::new(fetcher)
        .load(Ndoc::from(99_999))
        .await
        .expect_err("memo not published");
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_missing_index_fails() {
    let tmp = TempDir::new().expect("create temp dir");
    let fetcher = Fetcher::new(Arc::new(DirSource::new(tmp.path())));
    let err = IndexStore::load(&fetcher).await.expect_err("no index");
    assert!(err.is_not_found());
}
