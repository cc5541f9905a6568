//! CMakeLists.txt assembly
//!
//! Directives are collected into seven fixed sections as capabilities are
//! processed. Rendering walks the sections in their fixed order and skips any
//! section that ended up empty, so a section's header and separator only
//! appear when it has entries.

/// Where the daq-cmake functions are documented; section titles link into it
pub const DAQ_CMAKE_DOCS_URL: &str =
    "https://dune-daq-sw.readthedocs.io/en/latest/packages/daq-cmake/";

/// Minimum CMake version the generated file declares
pub const CMAKE_MINIMUM_VERSION: &str = "3.12";

/// Version a new package starts at
pub const INITIAL_PACKAGE_VERSION: &str = "0.0.0";

const SECTION_SEPARATOR: &str =
    "##############################################################################";

/// A section of the generated CMakeLists.txt, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Dependencies,
    Codegen,
    Library,
    PythonBindings,
    Plugins,
    Applications,
    UnitTests,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Section::Dependencies,
        Section::Codegen,
        Section::Library,
        Section::PythonBindings,
        Section::Plugins,
        Section::Applications,
        Section::UnitTests,
    ];

    /// Anchor of the section's daq-cmake documentation, if the section is titled
    pub fn anchor(&self) -> Option<&'static str> {
        match self {
            Section::Dependencies => None,
            Section::Codegen => Some("daq_codegen"),
            Section::Library => Some("daq_add_library"),
            Section::PythonBindings => Some("daq_add_python_bindings"),
            Section::Plugins => Some("daq_add_plugin"),
            Section::Applications => Some("daq_add_application"),
            Section::UnitTests => Some("daq_add_unit_test"),
        }
    }

    /// Comment line introducing the section
    pub fn title(&self) -> Option<String> {
        self.anchor()
            .map(|anchor| format!("# See {}#{}", DAQ_CMAKE_DOCS_URL, anchor))
    }
}

/// The build manifest of one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildManifest {
    package: String,
    sections: Vec<(Section, Vec<String>)>,
}

impl BuildManifest {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            sections: Section::ALL.iter().map(|s| (*s, Vec::new())).collect(),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    /// Append a directive to a section
    pub fn push(&mut self, section: Section, directive: impl Into<String>) {
        if let Some((_, entries)) = self.sections.iter_mut().find(|(s, _)| *s == section) {
            entries.push(directive.into());
        }
    }

    /// Directives of one section, in append order
    pub fn entries(&self, section: Section) -> &[String] {
        self.sections
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or(&[])
    }

    /// Sections that have at least one directive, in output order
    pub fn present_sections(&self) -> Vec<Section> {
        self.sections
            .iter()
            .filter(|(_, entries)| !entries.is_empty())
            .map(|(s, _)| *s)
            .collect()
    }

    /// Render the whole file. `generated_on` goes into the header comment.
    pub fn render(&self, generated_on: &str) -> String {
        let mut out = format!(
            "\n# This is a skeleton CMakeLists.txt file, auto-generated on\n\
             # {generated_on}.  The developer(s) of this package should delete\n\
             # this comment as well as adding dependent targets, packages,\n\
             # etc. specific to the package. For details on how to write a package,\n\
             # please see\n\
             # {docs}\n\
             \n\
             cmake_minimum_required(VERSION {cmake})\n\
             project({package} VERSION {version})\n\
             \n\
             find_package(daq-cmake REQUIRED)\n\
             \n\
             daq_setup_environment()\n\
             \n",
            generated_on = generated_on,
            docs = DAQ_CMAKE_DOCS_URL,
            cmake = CMAKE_MINIMUM_VERSION,
            package = self.package,
            version = INITIAL_PACKAGE_VERSION,
        );

        for (section, entries) in &self.sections {
            if entries.is_empty() {
                continue;
            }
            if let Some(title) = section.title() {
                out.push('\n');
                out.push_str(&title);
                out.push('\n');
            }
            for entry in entries {
                out.push('\n');
                out.push_str(entry);
            }
            out.push_str("\n\n");
            out.push_str(SECTION_SEPARATOR);
            out.push_str("\n\n");
        }

        out.push_str("daq_install()\n");
        out
    }
}

/// `find_package` for a required dependency
pub fn find_package(package: &str) -> String {
    format!("find_package({} REQUIRED)", package)
}

/// Boost unit test framework dependency, needed by every package
pub fn find_boost_unit_test() -> String {
    "find_package(Boost COMPONENTS unit_test_framework REQUIRED)".to_string()
}

/// Code generation from a module's configuration schema
pub fn codegen_schema(module: &str) -> String {
    format!(
        "daq_codegen({}.jsonnet TEMPLATES Structs.hpp.j2 Nljs.hpp.j2)",
        module.to_lowercase()
    )
}

/// Code generation from a module's monitoring info schema
pub fn codegen_info_schema(module: &str) -> String {
    format!(
        "daq_codegen({}info.jsonnet DEP_PKGS opmonlib TEMPLATES opmonlib/InfoStructs.hpp.j2 opmonlib/InfoNljs.hpp.j2)",
        module.to_lowercase()
    )
}

pub fn add_library() -> String {
    "daq_add_library( LINK_LIBRARIES ) # Any source files and/or dependent libraries to link in not yet determined"
        .to_string()
}

pub fn add_python_bindings() -> String {
    "daq_add_python_bindings(*.cpp LINK_LIBRARIES ${PROJECT_NAME} ) # Any additional libraries to link in beyond the main library not yet determined"
        .to_string()
}

pub fn add_plugin(module: &str) -> String {
    format!(
        "daq_add_plugin({} duneDAQModule LINK_LIBRARIES appfwk::appfwk) # Replace appfwk library with a more specific library when appropriate",
        module
    )
}

pub fn add_application(app: &str) -> String {
    format!(
        "daq_add_application({app} {app}.cxx LINK_LIBRARIES ) # Any libraries to link in not yet determined",
        app = app
    )
}

pub fn add_test_application(app: &str) -> String {
    format!(
        "daq_add_application({app} {app}.cxx TEST LINK_LIBRARIES ) # Any libraries to link in not yet determined",
        app = app
    )
}

pub fn add_unit_test(test: &str) -> String {
    format!(
        "daq_add_unit_test({} LINK_LIBRARIES)  # Any libraries to link in not yet determined",
        test
    )
}
