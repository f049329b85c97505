//! Package of generated Verilog modules.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::vir;

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("file system error: {error:?}")]
    Fs { error: io::Error },

    #[error("module `{name}` is added more than once")]
    DuplicateModule { name: String },
}

/// Package.
#[derive(Debug, Default)]
pub struct Package {
    /// Modules.
    pub modules: Vec<vir::Module>,
}

impl Package {
    /// Adds the given module to package.
    pub fn add(&mut self, module: vir::Module) { self.modules.push(module); }

    fn gen_vir_module<P: AsRef<Path>>(&self, module: &vir::Module, path_dir: P) -> Result<(), PackageError> {
        let path = path_dir.as_ref().join(format!("{}.v", module.name));
        let mut file = File::create(&path).map_err(|error| PackageError::Fs { error })?;

        writeln!(file, "{}", module).map_err(|error| PackageError::Fs { error })?;
        debug!(module = %module.name, path = %path.display(), "wrote verilog module");

        Ok(())
    }

    /// Generates Verilog code at the given directory path, one `<name>.v` file per module.
    pub fn gen_vir<P: AsRef<Path>>(&self, path_dir: P) -> Result<(), PackageError> {
        let mut names = HashSet::new();
        for module in &self.modules {
            if !names.insert(module.name.as_str()) {
                return Err(PackageError::DuplicateModule { name: module.name.clone() });
            }
        }

        fs::create_dir_all(path_dir.as_ref()).map_err(|error| PackageError::Fs { error })?;

        for module in &self.modules {
            self.gen_vir_module(module, path_dir.as_ref())?;
        }

        Ok(())
    }
}
