//! Declarative description of every reference-data screen.
//!
//! One `EntitySchema` drives the generic list, form, and mutation handlers.
//! Several backend resources list under a hyphenated path but accept writes
//! under the un-hyphenated one (`tipo-vivienda` / `tipovivienda`), so both are
//! recorded.

use crate::models::entity::PersonRole;
use crate::table::{ChipColor, ChipMapping, Column};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    TextArea,
    Integer,
    Number,
    Date,
    /// Id picked from another resource's list.
    Select {
        endpoint: &'static str,
        label_field: &'static str,
        role: Option<PersonRole>,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_len: usize,
}

const TEXT_MAX: usize = 255;

const fn text(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec { name, label, kind: FieldKind::Text, required: true, max_len: TEXT_MAX }
}

const fn opt_text(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec { name, label, kind: FieldKind::Text, required: false, max_len: TEXT_MAX }
}

const fn area(name: &'static str, label: &'static str, required: bool) -> FieldSpec {
    FieldSpec { name, label, kind: FieldKind::TextArea, required, max_len: 2000 }
}

const fn integer(name: &'static str, label: &'static str, required: bool) -> FieldSpec {
    FieldSpec { name, label, kind: FieldKind::Integer, required, max_len: 20 }
}

const fn date(name: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec { name, label, kind: FieldKind::Date, required: false, max_len: 10 }
}

const fn select(name: &'static str, label: &'static str, endpoint: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Select { endpoint, label_field: "nombre", role: None },
        required: true,
        max_len: 20,
    }
}

const fn select_by(
    name: &'static str,
    label: &'static str,
    endpoint: &'static str,
    label_field: &'static str,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Select { endpoint, label_field, role: None },
        required: true,
        max_len: 20,
    }
}

const fn person(name: &'static str, label: &'static str, role: PersonRole) -> FieldSpec {
    FieldSpec {
        name,
        label,
        kind: FieldKind::Select { endpoint: "persona", label_field: "nombre", role: Some(role) },
        required: true,
        max_len: 20,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub key: &'static str,
    pub header: &'static str,
    pub numeric: bool,
    pub status: bool,
}

const fn col(key: &'static str, header: &'static str) -> ColumnSpec {
    ColumnSpec { key, header, numeric: false, status: false }
}

const fn num(key: &'static str, header: &'static str) -> ColumnSpec {
    ColumnSpec { key, header, numeric: true, status: false }
}

const fn status(key: &'static str, header: &'static str) -> ColumnSpec {
    ColumnSpec { key, header, numeric: false, status: true }
}

/// Follow-up the backend needs after a create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostCreate {
    Nothing,
    GenerateActivities,
}

#[derive(Debug)]
pub struct EntitySchema {
    pub slug: &'static str,
    pub title: &'static str,
    pub singular: &'static str,
    pub list_endpoint: &'static str,
    pub write_endpoint: &'static str,
    pub columns: &'static [ColumnSpec],
    pub fields: &'static [FieldSpec],
    pub post_create: PostCreate,
}

const ID: ColumnSpec = num("id", "ID");

impl EntitySchema {
    pub fn table_columns(&self) -> Vec<Column> {
        self.columns
            .iter()
            .map(|c| {
                let mut column = Column::new(c.key, c.header);
                if c.numeric {
                    column = column.numeric();
                }
                if c.status {
                    column = column.chip(status_chips());
                }
                if c.key == "nombre" {
                    column = column.bold();
                }
                column
            })
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Distinct lists the form's select fields need.
    pub fn select_endpoints(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = Vec::new();
        for f in self.fields {
            if let FieldKind::Select { endpoint, .. } = f.kind {
                if !out.contains(&endpoint) {
                    out.push(endpoint);
                }
            }
        }
        out
    }
}

/// Status names the backend uses for projects, structures, and activities.
pub fn status_chips() -> ChipMapping {
    ChipMapping::new(&[
        ("Completado", ChipColor::Success),
        ("Finalizado", ChipColor::Success),
        ("En progreso", ChipColor::Warning),
        ("En proceso", ChipColor::Warning),
        ("Pendiente", ChipColor::Info),
        ("Suspendido", ChipColor::Error),
    ])
}

pub fn find(slug: &str) -> Option<&'static EntitySchema> {
    SCHEMAS.iter().find(|s| s.slug == slug)
}

pub fn all() -> &'static [EntitySchema] {
    SCHEMAS
}

const fn simple(slug: &'static str, title: &'static str, singular: &'static str, write: &'static str) -> EntitySchema {
    EntitySchema {
        slug,
        title,
        singular,
        list_endpoint: slug,
        write_endpoint: write,
        columns: NAME_COLUMNS,
        fields: NAME_FIELDS,
        post_create: PostCreate::Nothing,
    }
}

const NAME_COLUMNS: &[ColumnSpec] = &[ID, col("nombre", "Nombre")];
const NAME_FIELDS: &[FieldSpec] = &[text("nombre", "Nombre")];

static SCHEMAS: &[EntitySchema] = &[
    EntitySchema {
        slug: "proyecto",
        title: "Proyectos",
        singular: "Proyecto",
        list_endpoint: "proyecto",
        write_endpoint: "proyecto",
        columns: &[
            ID,
            col("nombre", "Nombre"),
            col("direccion", "Dirección"),
            col("ciudad.nombre", "Ciudad"),
            status("estado.nombre", "Estado"),
        ],
        fields: &[
            text("nombre", "Nombre"),
            opt_text("direccion", "Dirección"),
            select("id_ciudad", "Ciudad", "ciudad"),
        ],
        post_create: PostCreate::Nothing,
    },
    EntitySchema {
        slug: "conjunto",
        title: "Conjuntos",
        singular: "Conjunto",
        list_endpoint: "conjunto",
        write_endpoint: "conjunto",
        columns: &[
            ID,
            col("nombre", "Nombre"),
            col("proyecto.nombre", "Proyecto"),
            col("residente_encargado.nombre", "Residente encargado"),
            col("tipo_vivienda.nombre", "Tipo de vivienda"),
            status("estado.nombre", "Estado"),
        ],
        fields: &[
            text("nombre", "Nombre"),
            select("id_proyecto", "Proyecto", "proyecto"),
            person("id_residente_encargado", "Residente encargado", PersonRole::Residente),
            select("id_tipo_vivienda", "Tipo de vivienda", "tipo-vivienda"),
        ],
        post_create: PostCreate::Nothing,
    },
    EntitySchema {
        slug: "estructura",
        title: "Estructuras",
        singular: "Estructura",
        list_endpoint: "estructura",
        write_endpoint: "estructura",
        columns: &[
            ID,
            col("nombre", "Nombre"),
            col("conjunto.nombre", "Conjunto"),
            col("tipo_estructura.nombre", "Tipo de estructura"),
            status("estado.nombre", "Estado"),
        ],
        fields: &[
            text("nombre", "Nombre"),
            select("id_conjunto", "Conjunto", "conjunto"),
            select("id_tipo_estructura", "Tipo de estructura", "tipo-estructura"),
            select("id_estado", "Estado", "estado"),
        ],
        post_create: PostCreate::GenerateActivities,
    },
    EntitySchema {
        slug: "actividades-estructura",
        title: "Actividades por estructura",
        singular: "Actividad de estructura",
        list_endpoint: "actividades-estructura",
        write_endpoint: "actividadesestructura",
        columns: &[
            ID,
            col("actividad.nombre", "Actividad"),
            col("estructura.nombre", "Estructura"),
            col("descripcion", "Descripción"),
            col("fecha_inicio", "Inicio"),
            col("fecha_fin", "Fin"),
            status("estado.nombre", "Estado"),
        ],
        fields: &[
            select("id_actividad", "Actividad", "actividad"),
            select("id_estructura", "Estructura", "estructura"),
            area("descripcion", "Descripción", false),
            date("fecha_inicio", "Fecha de inicio"),
            date("fecha_fin", "Fecha de fin"),
            integer("id_reporte", "Reporte", false),
            select("id_estado", "Estado", "estado"),
        ],
        post_create: PostCreate::Nothing,
    },
    EntitySchema {
        slug: "actividad",
        title: "Actividades",
        singular: "Actividad",
        list_endpoint: "actividad",
        write_endpoint: "actividad",
        columns: &[
            ID,
            col("nombre", "Nombre"),
            col("etapa.nombre", "Etapa"),
            col("tipo_actividad.actividad", "Tipo de actividad"),
        ],
        fields: &[
            text("nombre", "Nombre"),
            select("id_etapa", "Etapa", "etapa"),
            select_by("id_tipo_actividad", "Tipo de actividad", "tipo-actividad", "actividad"),
        ],
        post_create: PostCreate::Nothing,
    },
    EntitySchema {
        slug: "reporte",
        title: "Reportes",
        singular: "Reporte",
        list_endpoint: "reporte",
        write_endpoint: "reporte",
        columns: &[
            ID,
            col("descripcion", "Descripción"),
            col("interventor.nombre", "Interventor"),
            col("residente.nombre", "Residente"),
            col("contratista.nombre", "Contratista"),
            status("resultado.nombre", "Resultado"),
        ],
        fields: &[
            area("descripcion", "Descripción", true),
            person("id_interventor", "Interventor", PersonRole::Interventor),
            person("id_residente", "Residente", PersonRole::Residente),
            person("id_contratista", "Contratista", PersonRole::Contratista),
            select("id_resultado", "Resultado", "resultado"),
        ],
        post_create: PostCreate::Nothing,
    },
    simple("resultado", "Resultados", "Resultado", "resultado"),
    EntitySchema {
        slug: "persona",
        title: "Personas",
        singular: "Persona",
        list_endpoint: "persona",
        write_endpoint: "persona",
        columns: &[
            ID,
            col("nombre", "Nombre"),
            num("cedula", "Cédula"),
            col("empresa.nombre", "Empresa"),
            col("telefono", "Teléfono"),
            col("rol.nombre", "Rol"),
        ],
        fields: &[
            text("nombre", "Nombre"),
            integer("cedula", "Cédula", true),
            select("id_empresa", "Empresa", "empresa"),
            integer("telefono", "Teléfono", false),
            select("id_rol", "Rol", "rol"),
        ],
        post_create: PostCreate::Nothing,
    },
    simple("ciudad", "Ciudades", "Ciudad", "ciudad"),
    EntitySchema {
        slug: "rol",
        title: "Roles",
        singular: "Rol",
        list_endpoint: "rol",
        write_endpoint: "rol",
        columns: &[ID, col("nombre", "Nombre"), col("descripcion", "Descripción")],
        fields: &[text("nombre", "Nombre"), area("descripcion", "Descripción", false)],
        post_create: PostCreate::Nothing,
    },
    EntitySchema {
        slug: "tipo-actividad",
        title: "Tipos de actividad",
        singular: "Tipo de actividad",
        list_endpoint: "tipo-actividad",
        write_endpoint: "tipoactividad",
        columns: &[ID, col("actividad", "Actividad")],
        fields: &[text("actividad", "Actividad")],
        post_create: PostCreate::Nothing,
    },
    simple("tipo-estructura", "Tipos de estructura", "Tipo de estructura", "tipoestructura"),
    simple("tipo-vivienda", "Tipos de vivienda", "Tipo de vivienda", "tipovivienda"),
    EntitySchema {
        slug: "empresa",
        title: "Empresas",
        singular: "Empresa",
        list_endpoint: "empresa",
        write_endpoint: "empresa",
        columns: &[ID, col("nombre", "Nombre"), col("descripcion", "Descripción")],
        fields: &[text("nombre", "Nombre"), area("descripcion", "Descripción", false)],
        post_create: PostCreate::Nothing,
    },
    EntitySchema {
        slug: "material-construccion",
        title: "Materiales de construcción",
        singular: "Material de construcción",
        list_endpoint: "material-construccion",
        write_endpoint: "materialconstruccion",
        columns: &[
            ID,
            col("nombre", "Nombre"),
            col("referencia", "Referencia"),
            col("dimensiones", "Dimensiones"),
        ],
        fields: &[
            text("nombre", "Nombre"),
            opt_text("referencia", "Referencia"),
            opt_text("dimensiones", "Dimensiones"),
        ],
        post_create: PostCreate::Nothing,
    },
    simple("zona", "Zonas", "Zona", "zona"),
    EntitySchema {
        slug: "zona-estructura",
        title: "Zonas por estructura",
        singular: "Zona de estructura",
        list_endpoint: "zona-estructura",
        write_endpoint: "zonaestructura",
        columns: &[ID, col("estructura.nombre", "Estructura"), col("zona.nombre", "Zona")],
        fields: &[
            select("id_estructura", "Estructura", "estructura"),
            select("id_zona", "Zona", "zona"),
        ],
        post_create: PostCreate::Nothing,
    },
    EntitySchema {
        slug: "materiales-estructura",
        title: "Materiales por estructura",
        singular: "Material de estructura",
        list_endpoint: "materiales-estructura",
        write_endpoint: "materialesestructura",
        columns: &[
            ID,
            col("material_construccion.nombre", "Material"),
            col("estructura.nombre", "Estructura"),
            col("descripcion", "Descripción"),
        ],
        fields: &[
            select("id_material_construccion", "Material", "material-construccion"),
            select("id_estructura", "Estructura", "estructura"),
            area("descripcion", "Descripción", false),
        ],
        post_create: PostCreate::Nothing,
    },
    // No list of design types exists, so the type is entered by id.
    EntitySchema {
        slug: "diseno",
        title: "Diseños",
        singular: "Diseño",
        list_endpoint: "diseño",
        write_endpoint: "diseño",
        columns: &[
            ID,
            num("id_tipo_diseño", "Tipo (id)"),
            col("tipo_diseño.nombre", "Tipo de diseño"),
            col("descripcion_diseño", "Descripción"),
        ],
        fields: &[
            integer("id_tipo_diseño", "Tipo de diseño", true),
            area("descripcion_diseño", "Descripción", true),
        ],
        post_create: PostCreate::Nothing,
    },
    EntitySchema {
        slug: "titulo",
        title: "Títulos",
        singular: "Título",
        list_endpoint: "titulo",
        write_endpoint: "titulo",
        columns: &[ID, col("indice", "Índice"), col("titulo", "Título")],
        fields: &[text("indice", "Índice"), text("titulo", "Título")],
        post_create: PostCreate::Nothing,
    },
    EntitySchema {
        slug: "capitulo",
        title: "Capítulos",
        singular: "Capítulo",
        list_endpoint: "capitulo",
        write_endpoint: "capitulo",
        columns: &[
            ID,
            col("titulo.titulo", "Título"),
            col("indice", "Índice"),
            col("capitulo", "Capítulo"),
        ],
        fields: &[
            select_by("id_titulo", "Título", "titulo", "titulo"),
            text("indice", "Índice"),
            text("capitulo", "Capítulo"),
        ],
        post_create: PostCreate::Nothing,
    },
    simple("ubicacion-estructura", "Ubicaciones de estructura", "Ubicación de estructura", "ubicacionestructura"),
    EntitySchema {
        slug: "etapa",
        title: "Etapas",
        singular: "Etapa",
        list_endpoint: "etapa",
        write_endpoint: "etapa",
        columns: &[ID, col("nombre", "Nombre"), col("descripcion", "Descripción")],
        fields: &[text("nombre", "Nombre"), area("descripcion", "Descripción", false)],
        post_create: PostCreate::Nothing,
    },
];
