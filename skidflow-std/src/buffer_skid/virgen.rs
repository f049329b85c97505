//! Verilog generation for the skid buffer.

use skidflow::vir::*;
use skidflow::Bits;

use super::SkidConfig;

fn ident(name: &str) -> Expression { Expression::ident(name) }

fn assign(lvalue: &str, expr: Expression) -> Statement { Statement::nonblocking_assignment(ident(lvalue), expr) }

fn always_ff(arms: Vec<(Expression, Vec<Statement>)>) -> ModuleItem {
    ModuleItem::AlwaysConstruct("always @(posedge clk)".to_string(), Statement::priority(arms))
}

impl SkidConfig {
    /// Generates a Verilog module implementing this configuration.
    ///
    /// Ports: `clk`, `rst` (synchronous, active high), `in_valid` / `in_ready` / `in_data` towards the
    /// producer and `out_valid` / `out_ready` / `out_data` towards the consumer.
    pub fn gen_vir_module(&self, name: &str) -> Module {
        let width = self.width;
        let zero = || Expression::number(&Bits::zero(width));
        let low = || Expression::number(&Bits::from([false]));
        let high = || Expression::number(&Bits::from([true]));
        let may_update = || Expression::or(Expression::not(ident("out_valid")), ident("out_ready"));

        let port_decls = vec![
            PortDeclaration::input(1, "clk"),
            PortDeclaration::input(1, "rst"),
            PortDeclaration::input(1, "in_valid"),
            PortDeclaration::output(1, "in_ready"),
            PortDeclaration::input(width, "in_data"),
            PortDeclaration::output(1, "out_valid"),
            PortDeclaration::input(1, "out_ready"),
            PortDeclaration::output(width, "out_data"),
        ];

        let mut decls = vec![
            Declaration::reg_zeroed(1, "shadow_valid"),
            Declaration::reg_zeroed(width, "shadow_data"),
            Declaration::net(1, "capture"),
            Declaration::net(width, "fwd_data"),
        ];
        if self.registered_output {
            decls.push(Declaration::reg_zeroed(1, "out_valid_reg"));
            decls.push(Declaration::reg_zeroed(width, "out_data_reg"));
        }

        let fresh_data = if self.low_power {
            Expression::conditional(ident("in_valid"), ident("in_data"), zero())
        } else {
            ident("in_data")
        };
        let fwd_data = Expression::conditional(ident("shadow_valid"), ident("shadow_data"), fresh_data);
        let conts = vec![
            ContinuousAssign::new(ident("in_ready"), Expression::not(ident("shadow_valid"))),
            ContinuousAssign::new(
                ident("capture"),
                Expression::and(
                    Expression::and(ident("in_valid"), ident("in_ready")),
                    Expression::and(ident("out_valid"), Expression::not(ident("out_ready"))),
                ),
            ),
            ContinuousAssign::new(ident("fwd_data"), fwd_data),
        ];

        let controller = always_ff(vec![
            (ident("rst"), vec![assign("shadow_valid", low())]),
            (ident("capture"), vec![assign("shadow_valid", high())]),
            (ident("out_ready"), vec![assign("shadow_valid", low())]),
        ]);

        let mut shadow_arms = Vec::new();
        if self.low_power {
            let idle = Expression::or(
                Expression::or(ident("rst"), Expression::not(ident("out_valid"))),
                ident("out_ready"),
            );
            shadow_arms.push((idle, vec![assign("shadow_data", zero())]));
        }
        shadow_arms.push((ident("capture"), vec![assign("shadow_data", ident("in_data"))]));
        let shadow = always_ff(shadow_arms);

        let output = if self.registered_output {
            let mut data_arms = Vec::new();
            if self.low_power {
                data_arms.push((ident("rst"), vec![assign("out_data_reg", zero())]));
            }
            data_arms.push((may_update(), vec![assign("out_data_reg", ident("fwd_data"))]));

            ModuleItem::Commented("registered output".to_string(), vec![
                ModuleItem::ContinuousAssigns(vec![
                    ContinuousAssign::new(ident("out_valid"), ident("out_valid_reg")),
                    ContinuousAssign::new(ident("out_data"), ident("out_data_reg")),
                ]),
                always_ff(vec![
                    (ident("rst"), vec![assign("out_valid_reg", low())]),
                    (may_update(), vec![assign(
                        "out_valid_reg",
                        Expression::or(ident("in_valid"), ident("shadow_valid")),
                    )]),
                ]),
                always_ff(data_arms),
            ])
        } else {
            let out_data = if self.low_power {
                Expression::conditional(ident("rst"), zero(), ident("fwd_data"))
            } else {
                ident("fwd_data")
            };
            let holding = Expression::or(ident("in_valid"), ident("shadow_valid"));
            let out_valid = Expression::and(Expression::not(ident("rst")), holding);

            ModuleItem::Commented("combinational output".to_string(), vec![ModuleItem::ContinuousAssigns(vec![
                ContinuousAssign::new(ident("out_valid"), out_valid),
                ContinuousAssign::new(ident("out_data"), out_data),
            ])])
        };

        Module {
            name: name.to_string(),
            port_decls,
            module_items: vec![
                ModuleItem::Declarations(decls),
                ModuleItem::ContinuousAssigns(conts),
                ModuleItem::Commented("handshake controller".to_string(), vec![controller]),
                ModuleItem::Commented("shadow register".to_string(), vec![shadow]),
                output,
            ],
        }
    }
}
