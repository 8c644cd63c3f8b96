//! Static reference material for common structural damage types.

use serde::Serialize;

/// Reference sheet for one damage type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KnowledgeEntry {
    pub key: &'static str,
    pub title: &'static str,
    pub definition: &'static str,
    pub causes: &'static [&'static str],
    pub severity: &'static str,
    pub action_required: &'static str,
}

static ENTRIES: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        key: "grieta_escalonada",
        title: "Grieta Escalonada",
        definition: "Fisura que sigue un patrón escalonado, típica de asentamientos diferenciales",
        causes: &[
            "Asentamiento diferencial del terreno",
            "Carga excesiva en cimientos",
            "Variaciones en la humedad del suelo",
        ],
        severity: "Media-Alta",
        action_required: "Evaluación estructural inmediata",
    },
    KnowledgeEntry {
        key: "humedad_interior",
        title: "Humedad Interior",
        definition: "Presencia de humedad en el interior de la estructura",
        causes: &[
            "Filtraciones de agua",
            "Condensación excesiva",
            "Falta de ventilación",
        ],
        severity: "Alta",
        action_required: "Revisión de sistemas hidráulicos",
    },
];

/// Look up a damage type by key, ignoring case and surrounding whitespace.
pub fn lookup(damage_type: &str) -> Option<&'static KnowledgeEntry> {
    let key = damage_type.trim();
    ENTRIES.iter().find(|e| e.key.eq_ignore_ascii_case(key))
}

/// Every known damage type key.
pub fn keys() -> impl Iterator<Item = &'static str> {
    ENTRIES.iter().map(|e| e.key)
}
