// Bundled preset rubrics, keyed by institution and course. This is read-only
// domain data shipped with the application; it is never mutated at runtime.
use dialoguer::theme::ColorfulTheme;
use dialoguer::Select;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// A named rubric document bundled with the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetRubric {
    pub name: &'static str,
    pub document: &'static str,
}

const PROGRAMACION_PARCIAL_RUBRIC: &str = r#"{
  "titulo": "Parcial de Programación I",
  "criterios": [
    { "nombre": "Correctitud de la solución", "peso": 0.4, "descripcion": "El programa resuelve todos los casos pedidos, incluidos los bordes." },
    { "nombre": "Diseño y modularización", "peso": 0.3, "descripcion": "Funciones cortas con una responsabilidad clara, sin código duplicado." },
    { "nombre": "Manejo de errores", "peso": 0.2, "descripcion": "Entradas inválidas detectadas y reportadas sin abortar." },
    { "nombre": "Estilo y legibilidad", "peso": 0.1, "descripcion": "Nombres significativos y formato consistente." }
  ],
  "escala": { "maximo": 10, "aprobacion": 6 }
}"#;

const PROGRAMACION_TP_RUBRIC: &str = r#"{
  "titulo": "Trabajo Práctico de Programación I",
  "criterios": [
    { "nombre": "Funcionalidad completa", "peso": 0.35, "descripcion": "Todos los requerimientos del enunciado implementados." },
    { "nombre": "Pruebas", "peso": 0.25, "descripcion": "Casos de prueba propios que cubren los escenarios principales." },
    { "nombre": "Documentación", "peso": 0.2, "descripcion": "Informe con decisiones de diseño y modo de uso." },
    { "nombre": "Defensa oral", "peso": 0.2, "descripcion": "El alumno explica y justifica su propia solución." }
  ],
  "escala": { "maximo": 10, "aprobacion": 6 }
}"#;

const BASES_DE_DATOS_PARCIAL_RUBRIC: &str = r#"{
  "titulo": "Parcial de Bases de Datos",
  "criterios": [
    { "nombre": "Modelo entidad-relación", "peso": 0.3, "descripcion": "Entidades, relaciones y cardinalidades correctas para el dominio." },
    { "nombre": "Normalización", "peso": 0.25, "descripcion": "Esquema en tercera forma normal con justificación." },
    { "nombre": "Consultas SQL", "peso": 0.35, "descripcion": "Consultas correctas y razonablemente eficientes." },
    { "nombre": "Integridad", "peso": 0.1, "descripcion": "Claves y restricciones declaradas." }
  ],
  "escala": { "maximo": 10, "aprobacion": 6 }
}"#;

const ALGORITMOS_FINAL_RUBRIC: &str = r#"{
  "titulo": "Final de Algoritmos y Estructuras de Datos",
  "criterios": [
    { "nombre": "Elección de estructuras", "peso": 0.3, "descripcion": "Estructura adecuada al problema con justificación de costos." },
    { "nombre": "Análisis de complejidad", "peso": 0.3, "descripcion": "Cotas temporales y espaciales correctas." },
    { "nombre": "Implementación", "peso": 0.3, "descripcion": "Código correcto para los algoritmos pedidos." },
    { "nombre": "Casos límite", "peso": 0.1, "descripcion": "Tratamiento de entradas vacías y degeneradas." }
  ],
  "escala": { "maximo": 10, "aprobacion": 4 }
}"#;

// Catalog built once on first access. BTreeMap keeps menu ordering stable.
static CATALOG: Lazy<BTreeMap<&'static str, BTreeMap<&'static str, Vec<PresetRubric>>>> =
    Lazy::new(|| {
        let mut institutions = BTreeMap::new();

        let mut utn: BTreeMap<&'static str, Vec<PresetRubric>> = BTreeMap::new();
        utn.insert(
            "Programación I",
            vec![
                PresetRubric {
                    name: "Parcial",
                    document: PROGRAMACION_PARCIAL_RUBRIC,
                },
                PresetRubric {
                    name: "Trabajo Práctico",
                    document: PROGRAMACION_TP_RUBRIC,
                },
            ],
        );
        utn.insert(
            "Bases de Datos",
            vec![PresetRubric {
                name: "Parcial",
                document: BASES_DE_DATOS_PARCIAL_RUBRIC,
            }],
        );
        institutions.insert("Universidad Tecnológica Nacional", utn);

        let mut uba: BTreeMap<&'static str, Vec<PresetRubric>> = BTreeMap::new();
        uba.insert(
            "Algoritmos y Estructuras de Datos",
            vec![PresetRubric {
                name: "Final",
                document: ALGORITMOS_FINAL_RUBRIC,
            }],
        );
        institutions.insert("Universidad de Buenos Aires", uba);

        institutions
    });

/// Returns the institutions that have bundled rubrics.
pub fn institutions() -> Vec<&'static str> {
    CATALOG.keys().copied().collect()
}

/// Returns the courses with bundled rubrics for an institution.
pub fn courses(institution: &str) -> Vec<&'static str> {
    CATALOG
        .get(institution)
        .map(|courses| courses.keys().copied().collect())
        .unwrap_or_default()
}

/// Returns the names of the bundled rubrics for an (institution, course) pair.
pub fn preset_names(institution: &str, course: &str) -> Vec<&'static str> {
    CATALOG
        .get(institution)
        .and_then(|courses| courses.get(course))
        .map(|presets| presets.iter().map(|preset| preset.name).collect())
        .unwrap_or_default()
}

/// Looks up a bundled rubric document by institution, course and name.
pub fn find_preset(institution: &str, course: &str, name: &str) -> Option<&'static str> {
    CATALOG
        .get(institution)
        .and_then(|courses| courses.get(course))
        .and_then(|presets| presets.iter().find(|preset| preset.name == name))
        .map(|preset| preset.document)
}

/// Interactively chooses a preset rubric through institution, course and
/// rubric menus. Returns `None` when the user exits at any level.
pub fn choose_preset() -> Option<PresetRubric> {
    let institution = choose_from("Choose an institution", institutions())?;
    let course = choose_from("Choose a course", courses(institution))?;

    let presets = CATALOG.get(institution)?.get(course)?;
    let mut menu_str: Vec<String> = presets.iter().map(|preset| preset.name.to_string()).collect();

    // Add EXIT at the end of the list
    menu_str.push("EXIT".to_string());

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Choose a rubric")
        .items(&menu_str)
        .default(0)
        .interact()
        .unwrap();

    if selection == menu_str.len() - 1 {
        return None;
    }

    Some(presets[selection])
}

fn choose_from(prompt: &str, options: Vec<&'static str>) -> Option<&'static str> {
    let mut menu_str: Vec<String> = options.iter().map(|option| option.to_string()).collect();
    menu_str.push("EXIT".to_string());

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(&menu_str)
        .default(0)
        .interact()
        .unwrap();

    if selection == menu_str.len() - 1 {
        return None;
    }

    Some(options[selection])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_util::parse_json_safely;

    #[test]
    fn test_catalog_is_keyed_by_institution_and_course() {
        let institutions = institutions();
        assert!(institutions.contains(&"Universidad Tecnológica Nacional"));

        let courses = courses("Universidad Tecnológica Nacional");
        assert!(courses.contains(&"Programación I"));

        let names = preset_names("Universidad Tecnológica Nacional", "Programación I");
        assert_eq!(names, vec!["Parcial", "Trabajo Práctico"]);
    }

    #[test]
    fn test_unknown_keys_yield_empty_results() {
        assert!(courses("Universidad Inexistente").is_empty());
        assert!(preset_names("Universidad Inexistente", "Nada").is_empty());
        assert!(find_preset("Universidad Inexistente", "Nada", "Parcial").is_none());
    }

    #[test]
    fn test_every_bundled_rubric_is_valid_json() {
        for institution in institutions() {
            for course in courses(institution) {
                for name in preset_names(institution, course) {
                    let document = find_preset(institution, course, name).unwrap();
                    assert!(
                        parse_json_safely(document).is_some(),
                        "preset {}/{}/{} is not valid JSON",
                        institution,
                        course,
                        name
                    );
                }
            }
        }
    }
}
