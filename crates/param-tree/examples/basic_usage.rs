//! Basic usage example for param-tree

use param_tree::{HandlebarsRenderer, Parameters, create_context_from_unknown_args};

fn main() -> param_tree::Result<()> {
    let source = r#"
trainer:
  batch_size: {{ batch_size }}
  lr: 0.1
  warmup_lr: $trainer.lr/10
data:
  train_path: /data/train
  cache_path: ${data.train_path}/cache
"#;

    // Template context usually comes from trailing command-line arguments
    let context = create_context_from_unknown_args(&["batch_size", "32"])?;
    let mut params = Parameters::from_templated_yaml_str(source, &context, &HandlebarsRenderer::new())?;

    println!("Resolved parameters:\n{params}");

    for (path, value) in params.flatten() {
        println!("{path} = {value}");
    }

    // Overrides re-resolve every reference
    params.update_str("trainer.lr", 0.5)?;
    println!("After override:\n{params}");

    Ok(())
}
