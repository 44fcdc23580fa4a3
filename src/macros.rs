/// Builds a [`Value`](crate::Value) tree from a JSON-like literal.
///
/// Map keys are string literals; leaves are any `Serialize` expression
/// written as a single token tree (wrap negative numbers in parentheses).
///
/// # Panics
///
/// Panics if a leaf cannot be converted with [`to_value`](crate::to_value),
/// or if memory for a map cannot be reserved, as `vec!` does.
///
/// # Examples
///
/// ```rust
/// use serde_dt::{dt, Value};
///
/// let user = dt!({
///     "name": "Alice",
///     "scores": [90, 85, (-1)],
///     "admin": false,
///     "manager": null
/// });
///
/// assert_eq!(user.get("name").and_then(Value::as_str), Some("Alice"));
/// assert_eq!(user.get_path(&["scores".into(), 2.into()]), Some(&Value::Int(-1)));
/// ```
#[macro_export]
macro_rules! dt {
    (null) => {
        $crate::Value::Null
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::array()
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::from(vec![$($crate::dt!($elem)),*])
    };

    ({}) => {
        $crate::Value::map()
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::ValueMap::new();
        $(
            if let Err(err) = map.insert($key, $crate::dt!($value)) {
                panic!("dt!: {}", err);
            }
        )*
        $crate::Value::Map(map)
    }};

    ($other:expr) => {
        match $crate::to_value(&$other) {
            Ok(value) => value,
            Err(err) => panic!("dt!: {}", err),
        }
    };
}
