//! Record types and variant families used across test suites.
//!
//! - `Base`: single family with [`A`] (`x`) and [`B`] (`y`)
//! - `Layer`: multi family with the same [`A`] and [`B`]
//! - `Optimizer`: single family with [`Sgd`] and [`AdamConfig`]
//! - `Metric`: multi family with [`Accuracy`] and [`AreaUnderCurveConfig`]
//! - records [`SingleRoot`], [`MultiRoot`], [`TrainConfig`], [`DataConfig`],
//!   [`ExperimentConfig`]
//!
//! [`registry`] registers all of them.

use indexmap::IndexMap;
use param_schema::{
    ConfigRecord, ConfigSchema, FieldSpec, Fields, ModuleRegistry, Namespace, RecordWriter,
    Result, Schema, register_variants, variant_family,
};
use param_tree::ParameterNode;

/// Namespace of every fixture type.
pub const NAMESPACE: Namespace = Namespace::new(module_path!());

pub trait Base: ConfigRecord {}
variant_family!(dyn Base, Single);

pub trait Layer: ConfigRecord {}
variant_family!(dyn Layer, Multi);

pub trait Optimizer: ConfigRecord {
    fn learning_rate(&self) -> f64;
}
variant_family!(dyn Optimizer, Single);

pub trait Metric: ConfigRecord {}
variant_family!(dyn Metric, Multi);

#[derive(Debug, Clone, PartialEq)]
pub struct A {
    pub x: i64,
}

impl ConfigSchema for A {
    const NAME: &'static str = "A";

    fn schema() -> Schema {
        Schema::new(Self::NAME).field(FieldSpec::of::<i64>("x").help("First coordinate"))
    }

    fn construct(mut fields: Fields) -> Result<Self> {
        Ok(Self { x: fields.take("x")? })
    }

    fn to_parameters(&self) -> ParameterNode {
        RecordWriter::new().field("x", self.x).finish()
    }
}

impl Base for A {}
impl Layer for A {}

#[derive(Debug, Clone, PartialEq)]
pub struct B {
    pub y: i64,
}

impl ConfigSchema for B {
    const NAME: &'static str = "B";

    fn schema() -> Schema {
        Schema::new(Self::NAME).field(FieldSpec::of::<i64>("y"))
    }

    fn construct(mut fields: Fields) -> Result<Self> {
        Ok(Self { y: fields.take("y")? })
    }

    fn to_parameters(&self) -> ParameterNode {
        RecordWriter::new().field("y", self.y).finish()
    }
}

impl Base for B {}
impl Layer for B {}

#[derive(Debug, Clone, PartialEq)]
pub struct Sgd {
    pub lr: f64,
    pub momentum: f64,
}

impl ConfigSchema for Sgd {
    const NAME: &'static str = "Sgd";

    fn schema() -> Schema {
        Schema::new(Self::NAME)
            .field(FieldSpec::of::<f64>("lr").help("Learning rate"))
            .field(FieldSpec::of::<f64>("momentum").optional())
    }

    fn construct(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            lr: fields.take("lr")?,
            momentum: fields.take_or("momentum", 0.0)?,
        })
    }

    fn to_parameters(&self) -> ParameterNode {
        RecordWriter::new()
            .field("lr", self.lr)
            .field("momentum", self.momentum)
            .finish()
    }
}

impl Optimizer for Sgd {
    fn learning_rate(&self) -> f64 {
        self.lr
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdamConfig {
    pub lr: f64,
    pub betas: Vec<f64>,
}

impl ConfigSchema for AdamConfig {
    const NAME: &'static str = "AdamConfig";

    fn schema() -> Schema {
        Schema::new(Self::NAME)
            .field(FieldSpec::of::<f64>("lr").help("Learning rate"))
            .field(FieldSpec::of::<Vec<f64>>("betas").optional())
    }

    fn construct(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            lr: fields.take("lr")?,
            betas: fields.take_or("betas", vec![0.9, 0.999])?,
        })
    }

    fn to_parameters(&self) -> ParameterNode {
        RecordWriter::new()
            .field("lr", self.lr)
            .field("betas", self.betas.clone())
            .finish()
    }
}

impl Optimizer for AdamConfig {
    fn learning_rate(&self) -> f64 {
        self.lr
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Accuracy {
    pub threshold: f64,
}

impl ConfigSchema for Accuracy {
    const NAME: &'static str = "Accuracy";

    fn schema() -> Schema {
        Schema::new(Self::NAME).field(FieldSpec::of::<f64>("threshold").help("Decision threshold"))
    }

    fn construct(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            threshold: fields.take("threshold")?,
        })
    }

    fn to_parameters(&self) -> ParameterNode {
        RecordWriter::new().field("threshold", self.threshold).finish()
    }
}

impl Metric for Accuracy {}

#[derive(Debug, Clone, PartialEq)]
pub struct AreaUnderCurveConfig {
    pub num_thresholds: u32,
}

impl ConfigSchema for AreaUnderCurveConfig {
    const NAME: &'static str = "AreaUnderCurveConfig";

    fn schema() -> Schema {
        Schema::new(Self::NAME).field(FieldSpec::of::<u32>("num_thresholds").optional())
    }

    fn construct(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            num_thresholds: fields.take_or("num_thresholds", 200)?,
        })
    }

    fn to_parameters(&self) -> ParameterNode {
        RecordWriter::new()
            .field("num_thresholds", self.num_thresholds)
            .finish()
    }
}

impl Metric for AreaUnderCurveConfig {}

/// Root record holding one `Base` variant.
#[derive(Debug)]
pub struct SingleRoot {
    pub module: Box<dyn Base>,
}

impl ConfigSchema for SingleRoot {
    const NAME: &'static str = "SingleRoot";

    fn schema() -> Schema {
        Schema::new(Self::NAME).field(FieldSpec::variant::<dyn Base>("module"))
    }

    fn construct(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            module: fields.variant("module")?,
        })
    }

    fn to_parameters(&self) -> ParameterNode {
        RecordWriter::new().variant("module", self.module.as_ref()).finish()
    }
}

/// Root record holding a list of `Layer` variants.
#[derive(Debug)]
pub struct MultiRoot {
    pub modules: Vec<Box<dyn Layer>>,
}

impl ConfigSchema for MultiRoot {
    const NAME: &'static str = "MultiRoot";

    fn schema() -> Schema {
        Schema::new(Self::NAME).field(FieldSpec::variants::<dyn Layer>("modules"))
    }

    fn construct(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            modules: fields.variants("modules")?,
        })
    }

    fn to_parameters(&self) -> ParameterNode {
        RecordWriter::new().variants("modules", &self.modules).finish()
    }
}

#[derive(Debug)]
pub struct TrainConfig {
    pub batch_size: i64,
    pub epochs: u32,
    pub optimizer: Box<dyn Optimizer>,
    pub metrics: Vec<Box<dyn Metric>>,
}

impl ConfigSchema for TrainConfig {
    const NAME: &'static str = "TrainConfig";

    fn schema() -> Schema {
        Schema::new(Self::NAME)
            .in_namespace(NAMESPACE)
            .field(FieldSpec::of::<i64>("batch_size").help("Samples per step"))
            .field(FieldSpec::of::<u32>("epochs").optional())
            .field(FieldSpec::variant::<dyn Optimizer>("optimizer").help("Optimizer settings"))
            .field(FieldSpec::variants::<dyn Metric>("metrics").optional())
    }

    fn construct(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            batch_size: fields.take("batch_size")?,
            epochs: fields.take_or("epochs", 1)?,
            optimizer: fields.variant("optimizer")?,
            metrics: fields.variants_or_empty("metrics")?,
        })
    }

    fn to_parameters(&self) -> ParameterNode {
        RecordWriter::new()
            .field("batch_size", self.batch_size)
            .field("epochs", self.epochs)
            .variant("optimizer", self.optimizer.as_ref())
            .variants("metrics", &self.metrics)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    pub paths: Vec<String>,
    pub shuffle: bool,
    pub weights: IndexMap<String, f64>,
}

impl ConfigSchema for DataConfig {
    const NAME: &'static str = "DataConfig";

    fn schema() -> Schema {
        Schema::new(Self::NAME)
            .in_namespace(NAMESPACE)
            .field(FieldSpec::of::<Vec<String>>("paths"))
            .field(FieldSpec::of::<bool>("shuffle").optional())
            .field(FieldSpec::of::<IndexMap<String, f64>>("weights").optional())
    }

    fn construct(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            paths: fields.take("paths")?,
            shuffle: fields.take_or("shuffle", true)?,
            weights: fields.take_or_default("weights")?,
        })
    }

    fn to_parameters(&self) -> ParameterNode {
        let weights: ParameterNode = self
            .weights
            .iter()
            .map(|(name, weight)| (name.clone(), *weight))
            .collect();
        RecordWriter::new()
            .field("paths", self.paths.clone())
            .field("shuffle", self.shuffle)
            .field("weights", weights)
            .finish()
    }
}

#[derive(Debug)]
pub struct ExperimentConfig {
    pub name: String,
    pub train: TrainConfig,
    pub data: DataConfig,
}

impl ConfigSchema for ExperimentConfig {
    const NAME: &'static str = "ExperimentConfig";

    fn schema() -> Schema {
        Schema::new(Self::NAME)
            .in_namespace(NAMESPACE)
            .field(FieldSpec::of::<String>("name").help("Experiment name"))
            .field(FieldSpec::record::<TrainConfig>("train").help("Training loop settings"))
            .field(FieldSpec::record::<DataConfig>("data"))
    }

    fn construct(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            name: fields.take("name")?,
            train: fields.record("train")?,
            data: fields.record("data")?,
        })
    }

    fn to_parameters(&self) -> ParameterNode {
        RecordWriter::new()
            .field("name", &self.name)
            .record("train", &self.train)
            .record("data", &self.data)
            .finish()
    }
}

/// A registry with every fixture family and record registered.
pub fn registry() -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    register_variants!(registry, dyn Base => [A, B]);
    register_variants!(registry, dyn Layer => [A, B]);
    register_variants!(registry, dyn Optimizer => [Sgd, AdamConfig]);
    register_variants!(registry, dyn Metric => [Accuracy, AreaUnderCurveConfig]);
    registry.register_record::<TrainConfig>(NAMESPACE);
    registry.register_record::<DataConfig>(NAMESPACE);
    registry.register_record::<ExperimentConfig>(NAMESPACE);
    registry
}

/// A complete experiment file exercising every conversion.
pub const EXPERIMENT_YAML: &str = "\
name: baseline
base_lr: '0.01'
train:
  batch_size: 4*8
  epochs: 3
  optimizer:
    module_name: Adam
    lr: $base_lr*10
  metrics:
    - module_name: Accuracy
      threshold: 0.5
    - module_name: AreaUnderCurve
data:
  paths: [train.csv, valid.csv]
  shuffle: no
  weights:
    train: 1
    valid: 0.5*0.5
";
